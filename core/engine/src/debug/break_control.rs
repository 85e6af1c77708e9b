//! Cross-thread break scheduling.
//!
//! The break flag is the only debug state shared across threads. It is a
//! two-state machine, `Idle` and `Scheduled`, held in an atomic cell so that
//! a monitoring thread or control channel can request a break while the
//! isolate is mid-execution on its own thread. Requests collapse: any number
//! of requests before consumption yield exactly one pending break.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::isolate::IsolateId;

const IDLE: u8 = 0;
const SCHEDULED: u8 = 1;

/// Observable state of the break flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakState {
    /// No break is pending.
    Idle,
    /// A break will fire at the next safe point.
    Scheduled,
}

/// The per-isolate break flag.
#[derive(Debug)]
pub(crate) struct BreakController {
    state: AtomicU8,
}

impl BreakController {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
        }
    }

    /// `Idle -> Scheduled`; idempotent. Never touches interpreter state.
    pub(crate) fn request(&self) {
        self.state.store(SCHEDULED, Ordering::SeqCst);
    }

    /// `Scheduled -> Idle`; idempotent. Advisory: a break whose dispatch has
    /// already begun is unaffected.
    pub(crate) fn cancel(&self) {
        self.state.store(IDLE, Ordering::SeqCst);
    }

    /// Non-destructive read. Legacy inspection only; the dispatcher never
    /// relies on it.
    pub(crate) fn is_scheduled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == SCHEDULED
    }

    /// The current state of the flag.
    pub(crate) fn state(&self) -> BreakState {
        if self.is_scheduled() {
            BreakState::Scheduled
        } else {
            BreakState::Idle
        }
    }

    /// Atomic `Scheduled -> Idle` transition, returning whether a break
    /// should fire now. The only state-mutating read; race-free against
    /// concurrent [`request`][Self::request] and [`cancel`][Self::cancel].
    pub(crate) fn consume_at_safe_point(&self) -> bool {
        self.state.swap(IDLE, Ordering::SeqCst) == SCHEDULED
    }
}

/// A cloneable, thread-safe handle to one isolate's break flag.
///
/// Obtained from [`Isolate::break_handle`][crate::Isolate::break_handle] and
/// freely sendable to other threads; it only flips the flag and never touches
/// the isolate itself.
#[derive(Debug, Clone)]
pub struct BreakHandle {
    isolate: IsolateId,
    controller: Arc<BreakController>,
}

impl BreakHandle {
    pub(crate) fn new(isolate: IsolateId, controller: Arc<BreakController>) -> Self {
        Self {
            isolate,
            controller,
        }
    }

    /// Schedules a break at the isolate's next safe point.
    pub fn request(&self) {
        log::trace!("isolate {:?}: break requested", self.isolate);
        self.controller.request();
    }

    /// Cancels a pending break, if one has not been consumed yet.
    pub fn cancel(&self) {
        log::trace!("isolate {:?}: break cancelled", self.isolate);
        self.controller.cancel();
    }

    /// Whether a break is currently pending.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.controller.is_scheduled()
    }

    /// The current break state.
    #[must_use]
    pub fn state(&self) -> BreakState {
        self.controller.state()
    }
}
