//! Runtime value model.
//!
//! Values are what an execution environment hands to a probe. Primitives are
//! held inline; arrays, objects and functions are reference types with
//! identity, so that the same object reached through two paths (or through
//! itself) is recognisably the same value.

use crate::type_name::NamingFailure;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Accessor property body. Host exceptions are reported as
/// [`NamingFailure::Thrown`]; a getter that re-enters the namer propagates
/// the namer's failure unchanged.
pub type Getter = Rc<dyn Fn() -> Result<Value, NamingFailure>>;

/// Identity of a reference value, stable for as long as the value is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueId(usize);

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    BigInt(Rc<str>),
    Symbol(Option<Rc<str>>),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(FunctionRef),
}

impl Value {
    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Value::String(text.into())
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(elements))
    }

    /// The `typeof` of the value.
    #[must_use]
    pub const fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::BigInt(_) => "bigint",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
        }
    }

    /// Identity of arrays, objects and functions; `None` for primitives.
    #[must_use]
    pub fn identity(&self) -> Option<ValueId> {
        match self {
            Value::Array(array) => Some(array.id()),
            Value::Object(object) => Some(object.id()),
            Value::Function(function) => Some(function.id()),
            _ => None,
        }
    }

    /// Weak handle to an array, object or function; `None` for primitives.
    #[must_use]
    pub fn downgrade(&self) -> Option<WeakValue> {
        match self {
            Value::Array(array) => Some(array.downgrade()),
            Value::Object(object) => Some(object.downgrade()),
            Value::Function(function) => Some(function.downgrade()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.into())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text.into())
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<bool> for Value {
    fn from(boolean: bool) -> Self {
        Value::Boolean(boolean)
    }
}

/// A reference value held without keeping it alive. The allocation stays
/// reserved while the handle exists, so the value's [`ValueId`] is not
/// reused by another value.
#[derive(Clone, Debug)]
pub struct WeakValue(WeakTarget);

#[derive(Clone, Debug)]
enum WeakTarget {
    Array(Weak<RefCell<Vec<Value>>>),
    Object(Weak<ObjectData>),
    Function(Weak<FunctionData>),
}

impl WeakValue {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match &self.0 {
            WeakTarget::Array(weak) => weak.strong_count() > 0,
            WeakTarget::Object(weak) => weak.strong_count() > 0,
            WeakTarget::Function(weak) => weak.strong_count() > 0,
        }
    }
}

// =============================================================================
// Arrays
// =============================================================================

#[derive(Clone)]
pub struct ArrayRef(Rc<RefCell<Vec<Value>>>);

impl ArrayRef {
    #[must_use]
    pub fn new(elements: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(elements)))
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Copy of the current elements. Callers iterate the copy so that code
    /// run while visiting an element may mutate the array.
    #[must_use]
    pub fn elements(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    #[must_use]
    pub fn id(&self) -> ValueId {
        ValueId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakValue {
        WeakValue(WeakTarget::Array(Rc::downgrade(&self.0)))
    }
}

// =============================================================================
// Objects
// =============================================================================

#[derive(Clone)]
pub enum Property {
    Data(Value),
    Accessor(Getter),
}

struct ObjectData {
    constructor: Option<String>,
    properties: RefCell<IndexMap<String, Property>>,
}

#[derive(Clone)]
pub struct ObjectRef(Rc<ObjectData>);

impl ObjectRef {
    /// A plain object literal (`{}`), whose constructor is `Object`.
    #[must_use]
    pub fn plain() -> Self {
        Self::instance_of("Object")
    }

    /// An instance of the named class.
    #[must_use]
    pub fn instance_of(constructor: &str) -> Self {
        Self::with_constructor(Some(constructor.to_string()))
    }

    /// An object without a prototype (`Object.create(null)`).
    #[must_use]
    pub fn without_prototype() -> Self {
        Self::with_constructor(None)
    }

    fn with_constructor(constructor: Option<String>) -> Self {
        Self(Rc::new(ObjectData {
            constructor,
            properties: RefCell::new(IndexMap::new()),
        }))
    }

    /// Plain object holding the given data properties.
    #[must_use]
    pub fn from_entries<'k>(entries: impl IntoIterator<Item = (&'k str, Value)>) -> Self {
        let object = Self::plain();
        for (key, value) in entries {
            object.set(key, value);
        }
        object
    }

    #[must_use]
    pub fn constructor_name(&self) -> Option<&str> {
        self.0.constructor.as_deref()
    }

    pub fn set(&self, key: &str, value: Value) {
        self.0
            .properties
            .borrow_mut()
            .insert(key.to_string(), Property::Data(value));
    }

    pub fn define_getter(&self, key: &str, getter: Getter) {
        self.0
            .properties
            .borrow_mut()
            .insert(key.to_string(), Property::Accessor(getter));
    }

    /// Own enumerable keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.0.properties.borrow().keys().cloned().collect()
    }

    /// Read a property, running its getter if it is an accessor. Missing
    /// keys read as `undefined`.
    pub fn get(&self, key: &str) -> Result<Value, NamingFailure> {
        let property = self.0.properties.borrow().get(key).cloned();
        match property {
            Some(Property::Data(value)) => Ok(value),
            Some(Property::Accessor(getter)) => getter(),
            None => Ok(Value::Undefined),
        }
    }

    #[must_use]
    pub fn id(&self) -> ValueId {
        ValueId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakValue {
        WeakValue(WeakTarget::Object(Rc::downgrade(&self.0)))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("constructor", &self.0.constructor)
            .field("keys", &self.keys())
            .finish()
    }
}

// =============================================================================
// Functions
// =============================================================================

#[derive(Debug)]
struct FunctionData {
    name: Option<String>,
    source: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FunctionRef(Rc<FunctionData>);

impl FunctionRef {
    /// A function whose source text is available, as `Function.prototype.toString`
    /// would return it.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        Self(Rc::new(FunctionData {
            name: None,
            source: Some(source.to_string()),
        }))
    }

    /// A host function whose source text cannot be read.
    #[must_use]
    pub fn native(name: &str) -> Self {
        Self(Rc::new(FunctionData {
            name: Some(name.to_string()),
            source: None,
        }))
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.0.source.as_deref()
    }

    #[must_use]
    pub fn id(&self) -> ValueId {
        ValueId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakValue {
        WeakValue(WeakTarget::Function(Rc::downgrade(&self.0)))
    }
}
