//! Debug event kinds, scoped handles and the per-occurrence event snapshot.

use std::cell::Cell;
use std::rc::Rc;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::context::ContextId;
use crate::error::DebugError;
use crate::isolate::IsolateId;
use crate::value::Value;

/// The closed set of debug events the engine can raise.
///
/// The integer identities are stable and used for any cross-boundary
/// serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum DebugEventKind {
    /// Execution paused at a safe point, either from a scheduled break or a
    /// breakpoint.
    Break = 1,
    /// An exception was thrown.
    Exception = 2,
    /// A script finished compiling.
    AfterCompile = 3,
    /// A script failed to compile.
    CompileError = 4,
    /// An async task changed lifecycle state.
    AsyncTaskEvent = 5,
}

/// A handle valid only for the duration of one event callback.
///
/// All handles produced for one event share a single validity flag; the
/// dispatcher clears it immediately after the listener returns. A retained
/// clone queried after that point fails with [`DebugError::StaleHandle`]
/// rather than yielding stale engine state.
#[derive(Debug, Clone)]
pub struct Scoped<T> {
    inner: T,
    alive: Rc<Cell<bool>>,
}

impl<T: Clone> Scoped<T> {
    /// Reads the handle's value.
    ///
    /// # Errors
    ///
    /// [`DebugError::StaleHandle`] if the event scope has been closed.
    pub fn get(&self) -> Result<T, DebugError> {
        if self.alive.get() {
            Ok(self.inner.clone())
        } else {
            Err(DebugError::StaleHandle)
        }
    }

    /// Whether the handle's event scope is still open.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.alive.get()
    }
}

/// Owner of the shared validity flag for one event's handles.
#[derive(Debug)]
pub(crate) struct EventScope {
    alive: Rc<Cell<bool>>,
}

impl EventScope {
    pub(crate) fn new() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
        }
    }

    pub(crate) fn handle<T>(&self, inner: T) -> Scoped<T> {
        Scoped {
            inner,
            alive: Rc::clone(&self.alive),
        }
    }

    /// Invalidates every handle issued from this scope.
    pub(crate) fn close(&self) {
        self.alive.set(false);
    }
}

/// Immutable snapshot describing one debug event occurrence.
///
/// Passed by reference to the registered listener. Its handles must not be
/// relied upon after the callback returns; the dispatcher invalidates them
/// immediately.
#[derive(Debug)]
pub struct EventDetails {
    kind: DebugEventKind,
    isolate: IsolateId,
    execution_state: Scoped<Value>,
    event_data: Scoped<Value>,
    event_context: Scoped<ContextId>,
    callback_data: Scoped<Value>,
}

impl EventDetails {
    pub(crate) fn new(
        scope: &EventScope,
        kind: DebugEventKind,
        isolate: IsolateId,
        execution_state: Value,
        event_data: Value,
        event_context: ContextId,
        callback_data: Value,
    ) -> Self {
        Self {
            kind,
            isolate,
            execution_state: scope.handle(execution_state),
            event_data: scope.handle(event_data),
            event_context: scope.handle(event_context),
            callback_data: scope.handle(callback_data),
        }
    }

    /// The event kind.
    #[must_use]
    pub fn event(&self) -> DebugEventKind {
        self.kind
    }

    /// The isolate the event was dispatched in.
    #[must_use]
    pub fn isolate_id(&self) -> IsolateId {
        self.isolate
    }

    /// Opaque snapshot of the execution state at the moment of the event.
    #[must_use]
    pub fn execution_state(&self) -> &Scoped<Value> {
        &self.execution_state
    }

    /// Event-specific payload, e.g. the exception object or compile info.
    #[must_use]
    pub fn event_data(&self) -> &Scoped<Value> {
        &self.event_data
    }

    /// The script-visible context active when the event fired. This is never
    /// the debug context, which is the current context while the listener
    /// runs.
    #[must_use]
    pub fn event_context(&self) -> &Scoped<ContextId> {
        &self.event_context
    }

    /// The opaque value supplied at listener registration, passed through
    /// unchanged.
    #[must_use]
    pub fn callback_data(&self) -> &Scoped<Value> {
        &self.callback_data
    }
}
