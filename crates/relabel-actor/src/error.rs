//! Actor layer errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`ActorError::MailboxClosed`] | `ACTOR_MAILBOX_CLOSED` | No |
//! | [`ActorError::NoRuntime`] | `ACTOR_NO_RUNTIME` | No |

use relabel_types::{ActorId, ErrorCode};
use thiserror::Error;

/// Actor layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
    /// The target actor has stopped and its mailbox is gone.
    #[error("mailbox closed: {0}")]
    MailboxClosed(ActorId),

    /// An actor was spawned outside a tokio runtime.
    #[error("no tokio runtime to spawn {0}")]
    NoRuntime(ActorId),
}

impl ErrorCode for ActorError {
    fn code(&self) -> &'static str {
        match self {
            Self::MailboxClosed(_) => "ACTOR_MAILBOX_CLOSED",
            Self::NoRuntime(_) => "ACTOR_NO_RUNTIME",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
