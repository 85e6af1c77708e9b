//! The single-slot event listener registration.

use std::fmt;

use super::event::EventDetails;
use crate::isolate::Isolate;
use crate::value::Value;

/// A debug event callback.
///
/// Invoked synchronously with the dispatching isolate and the event snapshot.
/// The callback does not take possession of the event data and must not rely
/// on it persisting after returning. It must not leave a pending exception in
/// the debug context; doing so is a fatal contract violation.
pub type EventCallback = Box<dyn FnMut(&mut Isolate, &EventDetails)>;

/// One registered listener: a callback plus the opaque data handed back
/// through [`EventDetails::callback_data`].
pub(crate) struct Listener {
    pub(crate) callback: EventCallback,
    pub(crate) data: Value,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}
