//! Minimal opaque value model used by the debug core.
//!
//! The full object model lives with the interpreter; the debug core only needs
//! an opaque, cheaply-clonable value type to thread through event payloads,
//! callback data and the scripted-call bridge, plus just enough object
//! structure for internal-property introspection.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// An engine value as seen by the debug core.
///
/// Clones are shallow; objects share their backing storage and compare by
/// identity.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The `undefined` value.
    #[default]
    Undefined,
    /// The `null` value.
    Null,
    /// A boolean.
    Boolean(bool),
    /// An integer.
    Integer(i64),
    /// An immutable string.
    String(Rc<str>),
    /// An object reference.
    Object(Object),
}

impl Value {
    /// Creates a string value.
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Self::String(s.into())
    }

    /// Returns `true` if this is the `undefined` value.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Object::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Object(_) => f.write_str("[object]"),
        }
    }
}

/// A heap object. Property storage is shared between clones.
#[derive(Debug, Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

#[derive(Debug, Default)]
struct ObjectInner {
    properties: RefCell<FxHashMap<String, Value>>,
    // Engine-internal slots, exposed only through diagnostic introspection.
    internal_slots: RefCell<Vec<(Rc<str>, Value)>>,
}

impl Object {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObjectInner::default()),
        }
    }

    /// Sets an ordinary property.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.inner.properties.borrow_mut().insert(name.into(), value);
    }

    /// Reads an ordinary property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.properties.borrow().get(name).cloned()
    }

    /// Attaches an engine-internal slot, visible only to
    /// [`DebugApi::get_internal_properties`][crate::DebugApi::get_internal_properties].
    pub fn set_internal_slot(&self, name: impl Into<Rc<str>>, value: Value) {
        self.inner
            .internal_slots
            .borrow_mut()
            .push((name.into(), value));
    }

    /// Reads a single internal slot by name.
    #[must_use]
    pub fn internal_slot(&self, name: &str) -> Option<Value> {
        self.inner
            .internal_slots
            .borrow()
            .iter()
            .find(|(slot, _)| &**slot == name)
            .map(|(_, value)| value.clone())
    }

    pub(crate) fn internal_slots(&self) -> Vec<(Rc<str>, Value)> {
        self.inner.internal_slots.borrow().clone()
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

/// An engine-level callable.
///
/// Invoked with an explicit receiver and argument slice; an `Err` result
/// carries the thrown value.
#[derive(Clone)]
pub struct NativeFunction {
    inner: Rc<dyn Fn(&Value, &[Value]) -> Result<Value, Value>>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction").finish_non_exhaustive()
    }
}

impl NativeFunction {
    /// Creates a callable from a plain function pointer.
    #[must_use]
    pub fn from_fn_ptr(f: fn(&Value, &[Value]) -> Result<Value, Value>) -> Self {
        Self { inner: Rc::new(f) }
    }

    /// Creates a callable from a capturing closure.
    #[must_use]
    pub fn from_closure(f: impl Fn(&Value, &[Value]) -> Result<Value, Value> + 'static) -> Self {
        Self { inner: Rc::new(f) }
    }

    /// Calls the function with the given receiver and arguments.
    ///
    /// # Errors
    ///
    /// Returns the thrown value if the callable throws.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, Value> {
        (self.inner)(this, args)
    }
}
