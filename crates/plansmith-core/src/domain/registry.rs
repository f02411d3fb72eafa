//! Immutable fact storage with key lookup.

use std::collections::HashMap;

use super::row::{Row, RowKind};
use super::value::{FactKey, Value};

/// An immutable input datum.
///
/// Identity is the id within its class; two facts with the same key are the
/// same fact regardless of field contents.
#[derive(Debug, Clone)]
pub struct Fact {
    pub id: i64,
    pub fields: Vec<Value>,
}

impl Fact {
    pub fn new(id: i64, fields: Vec<Value>) -> Self {
        Self { id, fields }
    }
}

/// Facts of every class, indexed by key.
///
/// Shared by reference between snapshots of a problem since facts never
/// change during a solve.
#[derive(Debug, Clone, Default)]
pub struct FactRegistry {
    classes: Vec<Vec<Fact>>,
    index: Vec<HashMap<i64, usize>>,
}

impl FactRegistry {
    pub(crate) fn new(classes: Vec<Vec<Fact>>) -> Self {
        let index = classes
            .iter()
            .map(|facts| facts.iter().enumerate().map(|(i, f)| (f.id, i)).collect())
            .collect();
        Self { classes, index }
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn facts(&self, class: usize) -> &[Fact] {
        self.classes.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Position of a fact within its class.
    pub fn position(&self, key: FactKey) -> Option<usize> {
        self.index.get(key.class)?.get(&key.id).copied()
    }

    pub fn get(&self, key: FactKey) -> Option<&Fact> {
        let position = self.position(key)?;
        self.classes.get(key.class)?.get(position)
    }

    pub fn contains(&self, key: FactKey) -> bool {
        self.position(key).is_some()
    }

    /// Row view of the fact at `index` within `class`.
    pub fn row(&self, class: usize, index: usize) -> Option<Row<'_>> {
        let fact = self.classes.get(class)?.get(index)?;
        Some(Row::new(RowKind::Fact(class), fact.id, &fact.fields, self))
    }

    /// Resolves a reference value to a row view of its fact.
    pub fn resolve(&self, value: &Value) -> Option<Row<'_>> {
        let key = value.as_fact_key()?;
        let fact = self.get(key)?;
        Some(Row::new(RowKind::Fact(key.class), fact.id, &fact.fields, self))
    }
}
