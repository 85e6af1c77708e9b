//! Error types surfaced by the debug core.

use thiserror::Error;

use crate::value::Value;

/// Errors produced by the fallible debug operations.
///
/// Listener registration and break scheduling are total and never fail; only
/// scoped-handle access, the legacy scripted-call bridge and the deprecated
/// compatibility surfaces can produce one of these.
#[derive(Debug, Clone, Error)]
pub enum DebugError {
    /// A [`Scoped`][crate::Scoped] handle was used after the event callback it
    /// was created for returned.
    #[error("handle used outside the event scope it was created in")]
    StaleHandle,

    /// The target of a scripted debugger call threw. Recoverable; carries the
    /// thrown value and is distinguishable from any legitimate return value,
    /// including `undefined`.
    #[error("uncaught exception in debugger call: {0}")]
    Exception(Value),

    /// No debug context could be produced for the isolate, e.g. a scripted
    /// call was attempted with no event listener registered.
    #[error("isolate is not in a debuggable state")]
    NotDebuggable,

    /// The operation is a deprecated compatibility stub.
    #[error("operation is no longer supported")]
    Unsupported,
}
