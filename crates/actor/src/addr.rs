use std::sync::Arc;

use tracing::Instrument;

use crate::mailbox::{Mailbox, MailboxParts};
use crate::scheduler::run_actor;
use crate::{Actor, MailboxClosed};

/// The address of a running actor.
///
/// Addresses are cheap to clone; the actor task keeps running as long
/// as at least one clone is alive and [`Addr::stop`] has not been
/// called.
pub struct Addr<A: Actor> {
    mailbox: Arc<Mailbox<A>>,
}

impl<A: Actor> Addr<A> {
    /// Spawns a new actor task owning `state`, with an optional label
    /// for the tracing span.
    pub fn spawn(state: A, label: Option<&str>) -> Self {
        let MailboxParts {
            mailbox,
            msg_rx,
            stop_rx,
        } = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_actor(Arc::downgrade(&mailbox), state, msg_rx, stop_rx)
                .instrument(trace_span!("actor", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub(crate) fn from_mailbox(mailbox: Arc<Mailbox<A>>) -> Self {
        Self { mailbox }
    }

    /// Posts a message to the actor's mailbox.
    #[inline]
    pub fn send(&self, msg: A::Msg) -> Result<(), MailboxClosed> {
        self.mailbox.send(msg)
    }

    /// Asks the actor task to stop.
    ///
    /// The task is not guaranteed to stop immediately, but it will not
    /// handle any further messages, including ones already queued.
    #[inline]
    pub fn stop(&self) {
        self.mailbox.signal_stop();
    }
}

impl<A: Actor> Clone for Addr<A> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}
