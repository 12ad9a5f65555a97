use colloquy_backend::ErrorKind;

/// The scripted outcome for one send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedReply {
    /// The backend answers with this reply text.
    Reply(String),
    /// The submission is accepted without a reply.
    Accepted,
    /// The request fails with the given error kind.
    Failure(ErrorKind),
}

impl ScriptedReply {
    /// Creates a `Reply` step from anything string-like.
    #[inline]
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(text.into())
    }
}
