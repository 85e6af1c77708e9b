//! The execution environment owning all debug state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::context::{Context, ContextId, ContextKind};
use crate::debug::DebugState;
use crate::debug::break_control::{BreakController, BreakHandle};
use crate::value::{Object, Value};

static NEXT_ISOLATE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier unique to one [`Isolate`] for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IsolateId(u64);

bitflags! {
    /// Per-isolate capability flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IsolateFlags: u8 {
        /// Live edit of compiled scripts is permitted. Enabled by default.
        const LIVE_EDIT = 1 << 0;
        /// Tail calls are eliminated by the compiler. Flipping this flag
        /// invalidates compiled artifacts that depend on it.
        const TAIL_CALL_ELIMINATION = 1 << 1;
    }
}

/// One fully isolated instance of the engine.
///
/// Script execution within an isolate is single-threaded; the only state that
/// may be touched from other threads is the break controller, reachable
/// through [`Isolate::break_handle`]. All debug state is destroyed with the
/// isolate.
#[derive(Debug)]
pub struct Isolate {
    id: IsolateId,
    contexts: FxHashMap<ContextId, Context>,
    context_stack: Vec<ContextId>,
    next_context: u64,
    flags: IsolateFlags,
    break_controller: Arc<BreakController>,
    exec_state_seq: u64,
    pub(crate) debug: DebugState,
}

impl Isolate {
    /// Creates a fresh isolate with no contexts and no debug state.
    #[must_use]
    pub fn new() -> Self {
        let id = IsolateId(NEXT_ISOLATE_ID.fetch_add(1, Ordering::Relaxed));
        log::debug!("created isolate {id:?}");
        Self {
            id,
            contexts: FxHashMap::default(),
            context_stack: Vec::new(),
            next_context: 1,
            flags: IsolateFlags::LIVE_EDIT,
            break_controller: Arc::new(BreakController::new()),
            exec_state_seq: 0,
            debug: DebugState::new(),
        }
    }

    /// The isolate's process-unique identifier.
    #[must_use]
    pub fn id(&self) -> IsolateId {
        self.id
    }

    /// Creates a new ordinary script context.
    pub fn new_context(&mut self) -> ContextId {
        self.new_context_of(ContextKind::Script)
    }

    pub(crate) fn new_context_of(&mut self, kind: ContextKind) -> ContextId {
        let id = ContextId(self.next_context);
        self.next_context += 1;
        self.contexts.insert(id, Context::new(id, kind));
        id
    }

    pub(crate) fn remove_context(&mut self, id: ContextId) {
        self.contexts.remove(&id);
    }

    /// Looks up a context by id.
    #[must_use]
    pub fn context(&self, id: ContextId) -> Option<&Context> {
        self.contexts.get(&id)
    }

    /// Looks up a context mutably by id.
    pub fn context_mut(&mut self, id: ContextId) -> Option<&mut Context> {
        self.contexts.get_mut(&id)
    }

    /// Pushes a context onto the active-context stack.
    pub fn enter_context(&mut self, id: ContextId) {
        debug_assert!(self.contexts.contains_key(&id), "entering unknown context");
        self.context_stack.push(id);
    }

    /// Pops the active-context stack, restoring the previous top.
    pub fn exit_context(&mut self) -> Option<ContextId> {
        self.context_stack.pop()
    }

    /// The currently active context, if any.
    #[must_use]
    pub fn current_context(&self) -> Option<ContextId> {
        self.context_stack.last().copied()
    }

    pub(crate) fn context_is_entered(&self, id: ContextId) -> bool {
        self.context_stack.contains(&id)
    }

    /// Returns a cloneable, thread-safe handle for scheduling and cancelling
    /// breaks in this isolate from any thread.
    #[must_use]
    pub fn break_handle(&self) -> BreakHandle {
        BreakHandle::new(self.id, Arc::clone(&self.break_controller))
    }

    pub(crate) fn break_controller(&self) -> &BreakController {
        &self.break_controller
    }

    /// The isolate's capability flags.
    #[must_use]
    pub fn flags(&self) -> IsolateFlags {
        self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut IsolateFlags {
        &mut self.flags
    }

    /// Counters describing dispatcher activity for this isolate.
    #[must_use]
    pub fn dispatch_stats(&self) -> crate::debug::DispatchStats {
        self.debug.stats
    }

    /// Builds an opaque snapshot of the current execution state.
    ///
    /// The snapshot is only meaningful for the duration of the event it is
    /// produced for; its contents are exposed through internal slots.
    pub fn capture_execution_state(&mut self) -> Value {
        self.exec_state_seq += 1;
        let state = Object::new();
        state.set_internal_slot(
            "[[StateSequence]]",
            Value::Integer(i64::try_from(self.exec_state_seq).unwrap_or(i64::MAX)),
        );
        state.set_internal_slot(
            "[[ContextDepth]]",
            Value::Integer(i64::try_from(self.context_stack.len()).unwrap_or(i64::MAX)),
        );
        Value::Object(state)
    }
}

impl Default for Isolate {
    fn default() -> Self {
        Self::new()
    }
}
