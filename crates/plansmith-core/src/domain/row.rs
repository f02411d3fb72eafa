//! Read-only record views handed to constraint functions.

use rust_decimal::Decimal;

use super::descriptor::FieldId;
use super::registry::FactRegistry;
use super::value::{FactKey, Value};

static NONE: Value = Value::None;

/// Which class a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Fact(usize),
    Entity(usize),
}

/// A borrowed view of one fact or entity.
///
/// Rows can follow fact references through the registry, so constraint
/// functions never need the fact data copied into entities.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    kind: RowKind,
    id: i64,
    fields: &'a [Value],
    registry: &'a FactRegistry,
}

impl<'a> Row<'a> {
    pub fn new(kind: RowKind, id: i64, fields: &'a [Value], registry: &'a FactRegistry) -> Self {
        Self {
            kind,
            id,
            fields,
            registry,
        }
    }

    pub fn kind(&self) -> RowKind {
        self.kind
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// The value of a field, or `Value::None` for an unknown index.
    pub fn get(&self, field: FieldId) -> &'a Value {
        self.fields.get(field.0).unwrap_or(&NONE)
    }

    pub fn int(&self, field: FieldId) -> Option<i64> {
        self.get(field).as_int()
    }

    pub fn decimal(&self, field: FieldId) -> Option<Decimal> {
        self.get(field).as_decimal()
    }

    pub fn bool(&self, field: FieldId) -> bool {
        self.get(field).as_bool().unwrap_or(false)
    }

    pub fn text(&self, field: FieldId) -> Option<&'a str> {
        self.get(field).as_text()
    }

    pub fn list(&self, field: FieldId) -> &'a [Value] {
        self.get(field).as_list().unwrap_or(&[])
    }

    /// Follows the fact reference stored in `field`.
    pub fn resolve(&self, field: FieldId) -> Option<Row<'a>> {
        self.registry.resolve(self.get(field))
    }

    /// The key of this row when it is a fact.
    pub fn key(&self) -> Option<FactKey> {
        match self.kind {
            RowKind::Fact(class) => Some(FactKey::new(class, self.id)),
            RowKind::Entity(_) => None,
        }
    }

    /// A value identifying this row: a reference for facts, the id for
    /// entities. Suitable as a join key against reference fields.
    pub fn identity(&self) -> Value {
        match self.key() {
            Some(key) => Value::Ref(key),
            None => Value::Int(self.id),
        }
    }

    pub fn registry(&self) -> &'a FactRegistry {
        self.registry
    }
}

impl std::fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("fields", &self.fields)
            .finish()
    }
}
