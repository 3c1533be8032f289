use std::cell::RefCell;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::runner::ds::blob::Blob;
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::lazy::LazyValue;
use crate::runner::ds::object::{MappingObject, RecordObject, SetObject};
use crate::runner::ds::operations::type_conversion::{
    to_display_string, TYPE_STR_NULL, TYPE_STR_UNDEFINED,
};
use crate::runner::ds::pattern::Pattern;
use crate::runner::ds::temporal::Temporal;

pub type SequenceRef = Rc<RefCell<Vec<Value>>>;
pub type MappingRef = Rc<RefCell<MappingObject>>;
pub type SetRef = Rc<RefCell<SetObject>>;
pub type RecordRef = Rc<RefCell<RecordObject>>;
pub type TemporalRef = Rc<RefCell<Temporal>>;
pub type PatternRef = Rc<RefCell<Pattern>>;
pub type BlobRef = Rc<Blob>;
pub type FunctionRef = Rc<FunctionObject>;
pub type LazyRef = Rc<LazyValue>;

/// A node of a value graph.
///
/// Scalars are held by value. Everything else is a shared handle, so two
/// `Value`s can point at the same container and a container may (directly or
/// indirectly) contain itself.
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(NumberType),
    String(String),
    Function(FunctionRef),
    Sequence(SequenceRef),
    Mapping(MappingRef),
    Set(SetRef),
    Record(RecordRef),
    Temporal(TemporalRef),
    Pattern(PatternRef),
    Blob(BlobRef),
    Lazy(LazyRef),
}
impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Undefined => Value::Undefined,
            Value::Null => Value::Null,
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Number(n) => Value::Number(n.clone()),
            Value::String(s) => Value::String(s.to_string()),
            Value::Function(f) => Value::Function(f.clone()),
            Value::Sequence(s) => Value::Sequence(s.clone()),
            Value::Mapping(m) => Value::Mapping(m.clone()),
            Value::Set(s) => Value::Set(s.clone()),
            Value::Record(r) => Value::Record(r.clone()),
            Value::Temporal(t) => Value::Temporal(t.clone()),
            Value::Pattern(p) => Value::Pattern(p.clone()),
            Value::Blob(b) => Value::Blob(b.clone()),
            Value::Lazy(l) => Value::Lazy(l.clone()),
        }
    }
}

impl Value {
    pub fn new_sequence(items: Vec<Value>) -> Self {
        Value::Sequence(Rc::new(RefCell::new(items)))
    }

    pub fn new_mapping(entries: Vec<(Value, Value)>) -> Self {
        let mut mapping = MappingObject::new();
        for (key, value) in entries {
            mapping.set(key, value);
        }
        Value::Mapping(Rc::new(RefCell::new(mapping)))
    }

    pub fn new_set(items: Vec<Value>) -> Self {
        let mut set = SetObject::new();
        for item in items {
            set.add(item);
        }
        Value::Set(Rc::new(RefCell::new(set)))
    }

    pub fn new_record(properties: Vec<(&str, Value)>) -> Self {
        let mut record = RecordObject::new();
        for (key, value) in properties {
            record.set(key.to_string(), value);
        }
        Value::Record(Rc::new(RefCell::new(record)))
    }

    pub fn new_temporal(temporal: Temporal) -> Self {
        Value::Temporal(Rc::new(RefCell::new(temporal)))
    }

    pub fn new_pattern(pattern: Pattern) -> Self {
        Value::Pattern(Rc::new(RefCell::new(pattern)))
    }

    pub fn new_blob(blob: Blob) -> Self {
        Value::Blob(Rc::new(blob))
    }

    pub fn new_function(function: FunctionObject) -> Self {
        Value::Function(Rc::new(function))
    }

    pub fn integer(i: i64) -> Self {
        Value::Number(NumberType::Integer(i))
    }

    pub fn float(f: f64) -> Self {
        Value::Number(NumberType::from_f64(f))
    }

    pub fn string(s: &str) -> Self {
        Value::String(s.to_string())
    }

    /// Address of the shared allocation behind this value, `None` for scalars.
    pub fn reference_address(&self) -> Option<usize> {
        match self {
            Value::Function(f) => Some(Rc::as_ptr(f) as *const () as usize),
            Value::Sequence(s) => Some(Rc::as_ptr(s) as *const () as usize),
            Value::Mapping(m) => Some(Rc::as_ptr(m) as *const () as usize),
            Value::Set(s) => Some(Rc::as_ptr(s) as *const () as usize),
            Value::Record(r) => Some(Rc::as_ptr(r) as *const () as usize),
            Value::Temporal(t) => Some(Rc::as_ptr(t) as *const () as usize),
            Value::Pattern(p) => Some(Rc::as_ptr(p) as *const () as usize),
            Value::Blob(b) => Some(Rc::as_ptr(b) as *const () as usize),
            Value::Lazy(l) => Some(Rc::as_ptr(l) as *const () as usize),
            _ => None,
        }
    }

    /// True for values which carry identity (everything except scalars).
    pub fn is_reference(&self) -> bool {
        self.reference_address().is_some()
    }

    /// True for the four traversable container kinds.
    pub fn is_container(&self) -> bool {
        match self {
            Value::Sequence(_) | Value::Mapping(_) | Value::Set(_) | Value::Record(_) => true,
            _ => false,
        }
    }

    pub fn is_absent(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordRef> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceRef> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Reads an own property of a record, `Undefined` when missing or when
    /// this value is no record.
    pub fn get_property(&self, key: &str) -> Value {
        match self {
            Value::Record(r) => r.borrow().get(key).cloned().unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        }
    }

    /// Number of direct children of a container, `None` otherwise.
    pub fn size(&self) -> Option<usize> {
        match self {
            Value::Sequence(s) => Some(s.borrow().len()),
            Value::Mapping(m) => Some(m.borrow().len()),
            Value::Set(s) => Some(s.borrow().len()),
            Value::Record(r) => Some(r.borrow().len()),
            _ => None,
        }
    }
}

/// Identity comparison: both values point at the same allocation.
pub fn same_reference(a: &Value, b: &Value) -> bool {
    match (a.reference_address(), b.reference_address()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "{}", TYPE_STR_UNDEFINED),
            Value::Null => write!(f, "{}", TYPE_STR_NULL),
            Value::String(s) => write!(f, "\"{}\"", s),
            _ => write!(f, "{}", to_display_string(self)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Value::Undefined"),
            Value::Null => write!(f, "Value::Null"),
            Value::Boolean(b) => write!(f, "Value::Boolean({})", b),
            Value::Number(n) => write!(f, "Value::Number({:?})", n),
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Function(func) => write!(f, "Value::Function({})", func.name),
            Value::Sequence(s) => write!(f, "Value::Sequence(len={})", s.borrow().len()),
            Value::Mapping(m) => write!(f, "Value::Mapping(size={})", m.borrow().len()),
            Value::Set(s) => write!(f, "Value::Set(size={})", s.borrow().len()),
            Value::Record(r) => write!(f, "Value::Record(keys={:?})", r.borrow().keys()),
            Value::Temporal(t) => write!(f, "Value::Temporal({})", t.borrow()),
            Value::Pattern(p) => write!(f, "Value::Pattern({})", p.borrow()),
            Value::Blob(b) => write!(f, "Value::Blob({})", b),
            Value::Lazy(l) => write!(f, "Value::Lazy({:?})", l.code()),
        }
    }
}

/// Strict identity-or-value equality (`===`): NaN is unequal to itself,
/// containers compare by reference.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            _ => same_reference(self, other),
        }
    }
}

#[derive(Debug)]
pub enum NumberType {
    Integer(i64),
    Float(f64),
    NaN,
    PositiveInfinity,
    NegativeInfinity,
}
impl NumberType {
    /// Normalizes a float into the most specific representation.
    pub fn from_f64(f: f64) -> Self {
        if f.is_nan() {
            NumberType::NaN
        } else if f == f64::INFINITY {
            NumberType::PositiveInfinity
        } else if f == f64::NEG_INFINITY {
            NumberType::NegativeInfinity
        } else if f.fract() == 0.0 && f.abs() < 9.0e15 && !(f == 0.0 && f.is_sign_negative()) {
            NumberType::Integer(f as i64)
        } else {
            NumberType::Float(f)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            NumberType::Integer(i) => *i as f64,
            NumberType::Float(f) => *f,
            NumberType::NaN => f64::NAN,
            NumberType::PositiveInfinity => f64::INFINITY,
            NumberType::NegativeInfinity => f64::NEG_INFINITY,
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            NumberType::NaN => true,
            NumberType::Float(f) => f.is_nan(),
            _ => false,
        }
    }
}
impl PartialEq for NumberType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NumberType::Integer(a), NumberType::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}
impl Clone for NumberType {
    fn clone(&self) -> Self {
        match self {
            NumberType::Integer(i) => NumberType::Integer(*i),
            NumberType::Float(nf) => NumberType::Float(*nf),
            NumberType::NaN => NumberType::NaN,
            NumberType::PositiveInfinity => NumberType::PositiveInfinity,
            NumberType::NegativeInfinity => NumberType::NegativeInfinity,
        }
    }
}
impl Display for NumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NumberType::Integer(i) => write!(f, "{}", i),
            NumberType::Float(nf) => write!(f, "{}", nf),
            NumberType::NaN => write!(f, "NaN"),
            NumberType::PositiveInfinity => write!(f, "Infinity"),
            NumberType::NegativeInfinity => write!(f, "-Infinity"),
        }
    }
}
