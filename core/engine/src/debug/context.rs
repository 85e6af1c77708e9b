//! Lifecycle of the isolated debugger evaluation context.
//!
//! The debug context exists only while a listener is registered. It is
//! created lazily on the first dispatch (or scripted call) and torn down when
//! the listener is cleared or the isolate dropped. It is entered only by the
//! dispatcher and the scripted-call bridge, so ordinary script execution
//! never observes it as the current context.

use crate::context::{ContextId, ContextKind};
use crate::isolate::Isolate;
use crate::value::Value;

impl Isolate {
    /// Returns the debug context, creating it on first need.
    pub(crate) fn ensure_debug_context(&mut self) -> ContextId {
        if let Some(id) = self.debug.debug_context {
            return id;
        }
        let id = self.new_context_of(ContextKind::Debug);
        if let Some(context) = self.context(id) {
            // Marks the global so injected debugger scripts can recognize
            // where they run.
            context
                .global()
                .set_internal_slot("[[DebugContext]]", Value::Boolean(true));
        }
        self.debug.debug_context = Some(id);
        log::debug!("isolate {:?}: created debug context {id:?}", self.id());
        id
    }

    /// Tears down the debug context, if one exists.
    pub(crate) fn drop_debug_context(&mut self) {
        if let Some(id) = self.debug.debug_context.take() {
            debug_assert!(
                !self.context_is_entered(id),
                "debug context torn down while still entered"
            );
            self.remove_context(id);
            log::debug!("isolate {:?}: torn down debug context {id:?}", self.id());
        }
    }
}
