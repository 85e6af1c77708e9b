//! The event dispatcher invoked at engine instrumentation points.

use super::event::{DebugEventKind, EventDetails, EventScope};
use crate::context::{Context, ContextId};
use crate::isolate::Isolate;
use crate::value::Value;

impl Isolate {
    /// Delivers one debug event to the registered listener, if any.
    ///
    /// Called by the engine at a legitimate instrumentation point with a
    /// frozen `execution_state` snapshot, the event payload, and the
    /// script-visible context that was active when the event fired. With no
    /// listener registered this is a counted no-op: no context is entered and
    /// no [`EventDetails`] is built.
    ///
    /// The listener runs inside the debug context; on return every handle the
    /// snapshot produced is invalidated and the previous context restored. A
    /// listener that leaves a pending exception in the debug context aborts
    /// the process.
    ///
    /// Not reentrant: the engine never raises an event while a dispatch for
    /// the same isolate is still on the stack. Scripted calls made during a
    /// dispatch go through [`DebugApi::call`][super::DebugApi::call] instead.
    pub fn dispatch_debug_event(
        &mut self,
        kind: DebugEventKind,
        execution_state: Value,
        event_data: Value,
        event_context: ContextId,
    ) {
        let Some(mut listener) = self.debug.listener.take() else {
            self.debug.stats.dropped_no_listener += 1;
            return;
        };
        debug_assert!(!self.debug.in_dispatch, "debug event dispatch reentered");

        let callback_data = listener.data.clone();
        let debug_context = self.ensure_debug_context();
        let scope = EventScope::new();
        let details = EventDetails::new(
            &scope,
            kind,
            self.id(),
            execution_state,
            event_data,
            event_context,
            callback_data,
        );

        log::trace!(
            "isolate {:?}: dispatching {kind:?} event from context {event_context:?}",
            self.id()
        );
        self.debug.stats.dispatched += 1;
        self.enter_context(debug_context);
        self.debug.stats.context_entries += 1;
        self.debug.in_dispatch = true;

        (listener.callback)(self, &details);

        self.debug.in_dispatch = false;
        if let Some(exception) = self
            .context_mut(debug_context)
            .and_then(Context::take_pending_exception)
        {
            fatal_dispatch_violation(&exception);
        }
        self.exit_context();
        scope.close();

        // The callback may have installed a replacement listener through the
        // documented-precondition escape hatch; it wins over the in-flight one.
        if self.debug.listener.is_none() {
            self.debug.listener = Some(listener);
        }
    }
}

/// A listener propagated an exception across the dispatch boundary. Debug
/// callbacks run in a trusted, embedder-controlled context; no recovery is
/// attempted.
fn fatal_dispatch_violation(exception: &Value) -> ! {
    log::error!("debug event listener threw across the dispatch boundary: {exception}");
    std::process::abort();
}
