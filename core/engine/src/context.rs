//! Script-visible evaluation contexts.

use crate::value::{Object, Value};

/// Identifier of a [`Context`] within its owning isolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub(crate) u64);

/// Distinguishes ordinary script contexts from the isolated debug context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// An ordinary context, reachable from script code.
    Script,
    /// The isolated debugger evaluation context. Never observable as the
    /// current context by ordinary script execution.
    Debug,
}

/// One evaluation context: a global object plus an exception slot.
#[derive(Debug)]
pub struct Context {
    id: ContextId,
    kind: ContextKind,
    global: Object,
    pending_exception: Option<Value>,
}

impl Context {
    pub(crate) fn new(id: ContextId, kind: ContextKind) -> Self {
        Self {
            id,
            kind,
            global: Object::new(),
            pending_exception: None,
        }
    }

    /// The context's identifier.
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Whether this is a script or debug context.
    #[must_use]
    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// The context's global object.
    #[must_use]
    pub fn global(&self) -> &Object {
        &self.global
    }

    /// Records a thrown value as the context's pending exception.
    pub fn throw(&mut self, exception: Value) {
        self.pending_exception = Some(exception);
    }

    /// The pending exception, if any.
    #[must_use]
    pub fn pending_exception(&self) -> Option<&Value> {
        self.pending_exception.as_ref()
    }

    pub(crate) fn take_pending_exception(&mut self) -> Option<Value> {
        self.pending_exception.take()
    }
}
