use std::sync::Weak;

use tokio::select;
use tokio::sync::{mpsc, watch};

use crate::mailbox::Mailbox;
use crate::{Actor, Addr};

#[inline]
pub async fn run_actor<A: Actor>(
    mailbox: Weak<Mailbox<A>>,
    mut state: A,
    mut msg_rx: mpsc::UnboundedReceiver<A::Msg>,
    mut stop_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let msg = select! {
            biased;

            _ = stop_rx.changed() => {
                break;
            }
            msg = msg_rx.recv() => {
                let Some(msg) = msg else {
                    break;
                };
                msg
            }
        };
        trace!("received message: {msg:?}");

        let Some(mailbox) = mailbox.upgrade() else {
            warn!("last address has been dropped, discard the message");
            break;
        };
        state.handle_msg(msg, &Addr::from_mailbox(mailbox));
    }
    debug!("will terminate");
}
