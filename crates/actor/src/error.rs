use std::error::Error;
use std::fmt;

/// The error returned when sending to an actor whose task has already
/// terminated.
pub struct MailboxClosed;

impl fmt::Debug for MailboxClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxClosed").finish()
    }
}

impl fmt::Display for MailboxClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "the actor's mailbox is closed".fmt(f)
    }
}

impl Error for MailboxClosed {}
