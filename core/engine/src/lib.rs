//! Kestrel's scripting engine debugger attachment core.
//!
//! This crate implements the subsystem that lets an external observer (a debugger
//! front end) attach to a running [`Isolate`], receive debug event notifications,
//! inspect execution state while an event is being delivered, and schedule a break
//! at the next safe point from any thread.
//!
//! # Overview
//!
//! The core consists of:
//!
//! - [`Isolate`]: one fully isolated engine instance; owns all debug state.
//! - [`DebugApi`]: the embedding surface for listener registration, break
//!   scheduling and the legacy scripted-call bridge.
//! - [`EventDetails`]: the immutable, event-scoped snapshot passed to the
//!   registered listener.
//! - [`debug::break_control`]: the cross-thread `Idle`/`Scheduled` break state
//!   machine.
//!
//! # Example
//!
//! ```
//! use kestrel_engine::{DebugApi, DebugEventKind, Isolate, Value};
//!
//! let mut isolate = Isolate::new();
//! let context = isolate.new_context();
//!
//! DebugApi::set_event_listener(
//!     &mut isolate,
//!     Some(Box::new(|_isolate, details| {
//!         assert_eq!(details.event(), DebugEventKind::AfterCompile);
//!     })),
//!     Value::Undefined,
//! );
//!
//! DebugApi::notify_after_compile(&mut isolate, context, Value::Undefined);
//! ```

pub mod context;
pub mod debug;
pub mod error;
pub mod isolate;
pub mod value;

pub use context::{Context, ContextId, ContextKind};
pub use debug::{
    BreakHandle, BreakState, DebugApi, DebugEventKind, DispatchStats, EventCallback, EventDetails,
    Scoped,
};
pub use error::DebugError;
pub use isolate::{Isolate, IsolateFlags, IsolateId};
pub use value::{NativeFunction, Object, Value};
