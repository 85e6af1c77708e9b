//! The public debugger surface exposed to an embedding application.

use super::event::DebugEventKind;
use super::listener::{EventCallback, Listener};
use crate::context::ContextId;
use crate::error::DebugError;
use crate::isolate::{Isolate, IsolateFlags};
use crate::value::{NativeFunction, Value};

/// Static entry points for debugger operations and event notifications.
///
/// Every operation is tied to one [`Isolate`]. Apart from break scheduling,
/// which is also reachable cross-thread through
/// [`Isolate::break_handle`], all operations must be called from the
/// isolate's single thread of control.
#[derive(Debug, Clone, Copy)]
pub struct DebugApi;

impl DebugApi {
    /// Installs or clears the debug event listener.
    ///
    /// At most one listener is registered per isolate; installing a new one
    /// replaces the previous registration, and passing `None` clears it and
    /// tears down the debug context. Returns whether a listener was
    /// registered before the call.
    ///
    /// Must not be called while a dispatch for the same isolate is on the
    /// stack, with one tolerated exception: a listener installed from within
    /// its own event callback replaces the in-flight one for subsequent
    /// events. Clearing from within a callback is ignored.
    pub fn set_event_listener(
        isolate: &mut Isolate,
        callback: Option<EventCallback>,
        data: Value,
    ) -> bool {
        let previous = isolate.debug.listener.is_some() || isolate.debug.in_dispatch;
        match callback {
            Some(callback) => {
                isolate.debug.listener = Some(Listener { callback, data });
                log::debug!("isolate {:?}: debug event listener installed", isolate.id());
            }
            None => {
                isolate.debug.listener = None;
                if isolate.debug.in_dispatch {
                    log::warn!(
                        "isolate {:?}: listener cleared during dispatch; ignored",
                        isolate.id()
                    );
                } else {
                    isolate.drop_debug_context();
                    log::debug!("isolate {:?}: debug event listener cleared", isolate.id());
                }
            }
        }
        previous
    }

    /// Whether a debug event listener is currently registered.
    #[must_use]
    pub fn has_event_listener(isolate: &Isolate) -> bool {
        isolate.debug.listener.is_some() || isolate.debug.in_dispatch
    }

    /// Schedules a debugger break at the isolate's next safe point.
    ///
    /// Equivalent to [`BreakHandle::request`][super::BreakHandle::request];
    /// use the handle to schedule from another thread.
    pub fn debug_break(isolate: &Isolate) {
        log::trace!("isolate {:?}: break requested", isolate.id());
        isolate.break_controller().request();
    }

    /// Removes a scheduled break if it has not been consumed yet. Advisory: a
    /// break whose dispatch has already begun is unaffected.
    pub fn cancel_debug_break(isolate: &Isolate) {
        log::trace!("isolate {:?}: break cancelled", isolate.id());
        isolate.break_controller().cancel();
    }

    /// Non-destructive read of the break flag.
    #[deprecated(note = "no longer supported; the engine consumes breaks at safe points")]
    #[must_use]
    pub fn check_debug_break(isolate: &Isolate) -> bool {
        isolate.break_controller().is_scheduled()
    }

    /// Safe-point hook: consumes a pending break and synthesizes a
    /// [`Break`][DebugEventKind::Break] event.
    ///
    /// Called by the engine at each point where pausing is legal. Returns
    /// whether a break was consumed. The consumption is atomic, so
    /// arbitrarily interleaved request/cancel sequences yield at most one
    /// break per uncancelled request.
    pub fn check_break(isolate: &mut Isolate, context: ContextId) -> bool {
        if !isolate.break_controller().consume_at_safe_point() {
            return false;
        }
        Self::notify(isolate, DebugEventKind::Break, context, Value::Undefined);
        true
    }

    /// Notifies the listener that execution hit an explicit break.
    pub fn notify_break(isolate: &mut Isolate, context: ContextId) {
        Self::notify(isolate, DebugEventKind::Break, context, Value::Undefined);
    }

    /// Notifies the listener of a thrown exception.
    pub fn notify_exception(isolate: &mut Isolate, context: ContextId, exception: Value) {
        Self::notify(isolate, DebugEventKind::Exception, context, exception);
    }

    /// Notifies the listener that a script finished compiling.
    pub fn notify_after_compile(isolate: &mut Isolate, context: ContextId, script_info: Value) {
        Self::notify(isolate, DebugEventKind::AfterCompile, context, script_info);
    }

    /// Notifies the listener that a script failed to compile.
    pub fn notify_compile_error(isolate: &mut Isolate, context: ContextId, error_info: Value) {
        Self::notify(isolate, DebugEventKind::CompileError, context, error_info);
    }

    /// Notifies the listener of an async task lifecycle event.
    pub fn notify_async_task_event(isolate: &mut Isolate, context: ContextId, task_info: Value) {
        Self::notify(isolate, DebugEventKind::AsyncTaskEvent, context, task_info);
    }

    fn notify(isolate: &mut Isolate, kind: DebugEventKind, context: ContextId, data: Value) {
        if isolate.debug.listener.is_none() {
            // Fast path: nothing registered, no snapshot is built.
            isolate.debug.stats.dropped_no_listener += 1;
            return;
        }
        let execution_state = isolate.capture_execution_state();
        isolate.dispatch_debug_event(kind, execution_state, data, context);
    }

    /// Runs an engine-level callable in the debugger (legacy bridge).
    ///
    /// Enters the debug context and invokes `function` with the current
    /// execution state as first argument and `data` as second, receiver bound
    /// to the debug context's global object. This gives access to state not
    /// otherwise reachable during normal execution, e.g. stack frame details.
    ///
    /// A single level of nesting inside an active dispatch is permitted;
    /// nesting a scripted call within a scripted call is not.
    ///
    /// # Errors
    ///
    /// - [`DebugError::Exception`] if the callable throws.
    /// - [`DebugError::NotDebuggable`] if no listener is registered (so no
    ///   debug context can be produced), the target context is unknown, or
    ///   the call would nest inside another scripted call.
    pub fn call(
        isolate: &mut Isolate,
        context: ContextId,
        function: &NativeFunction,
        data: Value,
    ) -> Result<Value, DebugError> {
        if !Self::has_event_listener(isolate) || isolate.context(context).is_none() {
            return Err(DebugError::NotDebuggable);
        }
        if isolate.debug.in_scripted_call {
            log::warn!(
                "isolate {:?}: rejected nested scripted debugger call",
                isolate.id()
            );
            return Err(DebugError::NotDebuggable);
        }

        let debug_context = isolate.ensure_debug_context();
        let receiver = match isolate.context(debug_context) {
            Some(ctx) => Value::Object(ctx.global().clone()),
            None => return Err(DebugError::NotDebuggable),
        };
        let execution_state = isolate.capture_execution_state();

        isolate.enter_context(debug_context);
        isolate.debug.stats.context_entries += 1;
        isolate.debug.in_scripted_call = true;

        let result = function.call(&receiver, &[execution_state, data]);

        isolate.debug.in_scripted_call = false;
        isolate.exit_context();

        result.map_err(|exception| {
            log::debug!(
                "isolate {:?}: scripted debugger call threw: {exception}",
                isolate.id()
            );
            DebugError::Exception(exception)
        })
    }

    /// Returns internal properties of a value as alternating name/value
    /// pairs, or an empty sequence for values without internal properties.
    ///
    /// The result is allocated in the caller's current context.
    #[must_use]
    pub fn get_internal_properties(isolate: &Isolate, value: &Value) -> Vec<Value> {
        log::trace!(
            "isolate {:?}: internal properties requested in context {:?}",
            isolate.id(),
            isolate.current_context()
        );
        match value {
            Value::Object(object) => object
                .internal_slots()
                .into_iter()
                .flat_map(|(name, value)| [Value::String(name), value])
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Enables or disables live editing of compiled scripts for the isolate.
    /// Enabled by default.
    pub fn set_live_edit_enabled(isolate: &mut Isolate, enable: bool) {
        isolate.flags_mut().set(IsolateFlags::LIVE_EDIT, enable);
    }

    /// Whether tail call elimination is enabled for the isolate.
    #[must_use]
    pub fn is_tail_call_elimination_enabled(isolate: &Isolate) -> bool {
        isolate.flags().contains(IsolateFlags::TAIL_CALL_ELIMINATION)
    }

    /// Enables or disables tail call elimination. Flipping the flag
    /// invalidates compiled artifacts that depend on calls at tail position.
    pub fn set_tail_call_elimination_enabled(isolate: &mut Isolate, enabled: bool) {
        isolate
            .flags_mut()
            .set(IsolateFlags::TAIL_CALL_ELIMINATION, enabled);
    }

    /// Returns a mirror object for the given value.
    ///
    /// # Errors
    ///
    /// Always [`DebugError::Unsupported`]; the mirror protocol is a retired
    /// compatibility surface.
    #[deprecated(note = "no longer supported")]
    pub fn get_mirror(_isolate: &Isolate, _value: &Value) -> Result<Value, DebugError> {
        Err(DebugError::Unsupported)
    }

    /// The debugger's own evaluation context, if one exists. It exists only
    /// while a listener is registered.
    #[deprecated(note = "use the event snapshot's context instead")]
    #[must_use]
    pub fn get_debug_context(isolate: &Isolate) -> Option<ContextId> {
        isolate.debug.debug_context
    }

    /// The top-most non-debug context while in the debug context.
    ///
    /// # Errors
    ///
    /// Always [`DebugError::Unsupported`].
    #[deprecated(note = "no longer supported")]
    pub fn get_debugged_context(_isolate: &Isolate) -> Result<ContextId, DebugError> {
        Err(DebugError::Unsupported)
    }
}
