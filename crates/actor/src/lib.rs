//! A minimal single-owner actor runtime.
//!
//! One tokio task owns a state value and consumes messages from an
//! unbounded mailbox, so every mutation of the state is a single
//! scheduler turn. The task stops when it is told to (see
//! [`Addr::stop`]) or when the last address is gone, which makes the
//! address set double as a cancellation scope: messages posted by
//! still-running background work after teardown are discarded, never
//! applied.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod addr;
mod error;
mod mailbox;
mod scheduler;

pub use addr::Addr;
pub use error::MailboxClosed;

/// A state value that can be owned and driven by an actor task.
///
/// The runtime never touches the state concurrently: `handle_msg` is
/// called for one message at a time, in mailbox order, with exclusive
/// access. Handlers may post follow-up messages to themselves (or hand
/// clones of the address to spawned tasks) through `addr`.
pub trait Actor: Sized + Send + 'static {
    /// The message type this actor consumes.
    type Msg: Send + std::fmt::Debug + 'static;

    /// Handles one message with exclusive access to the state.
    fn handle_msg(&mut self, msg: Self::Msg, addr: &Addr<Self>);
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;

    #[derive(Default)]
    struct Counter {
        value: u32,
    }

    #[derive(Debug)]
    enum CounterMsg {
        Add(u32),
        Get(oneshot::Sender<u32>),
    }

    impl Actor for Counter {
        type Msg = CounterMsg;

        fn handle_msg(&mut self, msg: CounterMsg, _addr: &Addr<Self>) {
            match msg {
                CounterMsg::Add(n) => self.value += n,
                CounterMsg::Get(reply_tx) => {
                    reply_tx.send(self.value).unwrap();
                }
            }
        }
    }

    #[tokio::test]
    async fn test_send_message() {
        let addr = Addr::spawn(Counter::default(), Some("counter"));
        addr.send(CounterMsg::Add(40)).unwrap();
        addr.send(CounterMsg::Add(2)).unwrap();

        let (tx, rx) = oneshot::channel();
        addr.send(CounterMsg::Get(tx)).unwrap();
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_stop_discards_pending_messages() {
        let addr = Addr::spawn(Counter::default(), None);
        addr.stop();

        // The stop signal wins over queued messages, so this `Get` is
        // dropped unanswered and the reply channel reports an error.
        let (tx, rx) = oneshot::channel();
        addr.send(CounterMsg::Get(tx)).ok();
        assert!(rx.await.is_err());
    }
}
