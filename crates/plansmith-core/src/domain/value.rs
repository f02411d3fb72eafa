//! Field values.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

/// Key of a fact: its class index in the descriptor and its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactKey {
    pub class: usize,
    pub id: i64,
}

impl FactKey {
    pub const fn new(class: usize, id: i64) -> Self {
        Self { class, id }
    }
}

/// A value stored in a fact or entity field.
///
/// Values are totally ordered and hashable so any of them can serve as a
/// join key, a group key or an interval bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Value {
    /// Unassigned planning variable or absent field.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(Arc<str>),
    /// Back-reference to a fact, resolved through the fact registry.
    Ref(FactKey),
    List(Vec<Value>),
}

impl Value {
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Value::Text(s.into())
    }

    pub fn fact(class: usize, id: i64) -> Self {
        Value::Ref(FactKey::new(class, id))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a decimal; integers convert exactly.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            Value::Int(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_fact_key(&self) -> Option<FactKey> {
        match self {
            Value::Ref(key) => Some(*key),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Checks if this list contains the given value.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Value::List(items) => items.contains(value),
            _ => false,
        }
    }

    // Visits every fact key held by this value, including inside lists.
    pub(crate) fn for_each_fact_key(&self, f: &mut impl FnMut(FactKey)) {
        match self {
            Value::Ref(key) => f(*key),
            Value::List(items) => items.iter().for_each(|item| item.for_each_fact_key(f)),
            _ => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Ref(key) => write!(f, "#{}:{}", key.class, key.id),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.into())
    }
}

impl From<FactKey> for Value {
    fn from(key: FactKey) -> Self {
        Value::Ref(key)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
