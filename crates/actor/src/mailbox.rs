use tokio::sync::{mpsc, watch};

use crate::{Actor, MailboxClosed};

pub struct MailboxParts<A: Actor> {
    pub mailbox: Mailbox<A>,
    pub msg_rx: mpsc::UnboundedReceiver<A::Msg>,
    pub stop_rx: watch::Receiver<bool>,
}

pub struct Mailbox<A: Actor> {
    msg_tx: mpsc::UnboundedSender<A::Msg>,
    stop_tx: watch::Sender<bool>,
}

impl<A: Actor> Mailbox<A> {
    #[inline]
    pub fn new() -> MailboxParts<A> {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        MailboxParts {
            mailbox: Mailbox { msg_tx, stop_tx },
            msg_rx,
            stop_rx,
        }
    }

    #[inline]
    pub fn send(&self, msg: A::Msg) -> Result<(), MailboxClosed> {
        self.msg_tx.send(msg).map_err(|_| MailboxClosed)
    }

    #[inline]
    pub fn signal_stop(&self) {
        self.stop_tx.send(true).ok();
    }
}
