//! Error types for the engine.
//!
//! Two distinct failure channels exist: `UiError` for the engine's own
//! lifecycle contract (a write to a closed session is a programming error and
//! must fail loudly), and `HandlerError` for faults raised inside a slot's
//! interaction handler, which the dispatch boundary converts into an
//! unconditional cancel of the interaction.

use thiserror::Error;

use crate::types::SessionId;

/// Boxed error raised by a slot interaction handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of running a slot interaction handler.
pub type HandlerResult = Result<crate::interaction::ClickPermit, HandlerError>;

/// Result alias for engine operations.
pub type UiResult<T> = Result<T, UiError>;

#[derive(Debug, Error)]
pub enum UiError {
    /// A cell write was attempted on a session that is not (or no longer)
    /// registered. Indicates a stale or closed session, never recoverable
    /// input.
    #[error("write to unregistered session (cell {cell})")]
    UnregisteredWrite { cell: usize },

    /// A registry operation referenced a session id that is not registered.
    #[error("unknown {0}")]
    UnknownSession(SessionId),
}
