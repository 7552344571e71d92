//! The failure channel shared by every generated binding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP-style status code of a finished exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub u16);

impl Status {
    pub const OK: Status = Status(200);
    pub const BAD_REQUEST: Status = Status(400);
    pub const NOT_FOUND: Status = Status(404);
    pub const INTERNAL_SERVER_ERROR: Status = Status(500);

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a call did not produce its results.
///
/// Two classes matter to callers: the exchange itself broke
/// ([`Failure::is_transport`]), or the other side answered with an error
/// ([`Failure::is_remote`]). Implementations usually return
/// [`Failure::Message`] via [`Failure::msg`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// Raised by an implementation.
    #[error("{0}")]
    Message(String),

    /// The exchange could not be performed (connection refused, reset, ...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request could not be serialized.
    #[error("failed to encode payload: {0}")]
    Encode(String),

    /// A payload did not match the expected shape.
    #[error("failed to decode payload: {0}")]
    Decode(String),

    /// The exchange completed with a non-success status.
    #[error("remote call failed with status {status}: {message}")]
    Remote { status: Status, message: String },

    #[error("call cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Failure {
    pub fn msg(message: impl Into<String>) -> Self {
        Failure::Message(message.into())
    }

    /// The exchange did not complete.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Failure::Transport(_)
                | Failure::Encode(_)
                | Failure::Decode(_)
                | Failure::Cancelled
                | Failure::DeadlineExceeded
        )
    }

    /// The remote side answered with an error status.
    pub fn is_remote(&self) -> bool {
        matches!(self, Failure::Remote { .. })
    }

    /// Status reported by the remote side, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            Failure::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
