//! Kestrel's debugger attachment core.
//!
//! An external observer attaches to an [`Isolate`][crate::Isolate] by
//! registering a single event listener through [`DebugApi`]. The engine calls
//! into this module at its instrumentation points; when a listener is
//! registered, the dispatcher freezes a consistent snapshot of the event into
//! an [`EventDetails`], enters the isolated debug context, invokes the
//! listener, and restores the previous context on return.
//!
//! # Components
//!
//! - [`event`]: event kinds, scoped handles and the [`EventDetails`] snapshot.
//! - [`break_control`]: the cross-thread `Idle`/`Scheduled` break flag.
//! - [`api`]: the public embedding surface, including the legacy
//!   scripted-call bridge.
//!
//! Everything except the break flag is owned by the isolate's single thread
//! of control and requires no locking.

pub mod api;
pub mod break_control;
mod context;
mod dispatch;
pub mod event;
mod listener;

pub use api::DebugApi;
pub use break_control::{BreakHandle, BreakState};
pub use event::{DebugEventKind, EventDetails, Scoped};
pub use listener::EventCallback;

use std::fmt;

use crate::context::ContextId;
use listener::Listener;

/// Counters describing dispatcher activity, for instrumentation and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events delivered to a listener.
    pub dispatched: u64,
    /// Events dropped on the fast path because no listener was registered.
    pub dropped_no_listener: u64,
    /// Times the debug context was entered, by dispatch or scripted calls.
    pub context_entries: u64,
}

/// Debug state owned by one isolate.
pub(crate) struct DebugState {
    pub(crate) listener: Option<Listener>,
    pub(crate) debug_context: Option<ContextId>,
    pub(crate) in_dispatch: bool,
    pub(crate) in_scripted_call: bool,
    pub(crate) stats: DispatchStats,
}

impl DebugState {
    pub(crate) fn new() -> Self {
        Self {
            listener: None,
            debug_context: None,
            in_dispatch: false,
            in_scripted_call: false,
            stats: DispatchStats::default(),
        }
    }
}

impl fmt::Debug for DebugState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugState")
            .field("has_listener", &self.listener.is_some())
            .field("debug_context", &self.debug_context)
            .field("in_dispatch", &self.in_dispatch)
            .field("in_scripted_call", &self.in_scripted_call)
            .field("stats", &self.stats)
            .finish()
    }
}
