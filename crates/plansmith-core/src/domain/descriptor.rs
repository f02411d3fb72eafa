//! Schema definition types for problems.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ModelError;

use super::value::Value;

/// Index of a field within its class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub usize);

impl FieldId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Declared domain of a planning variable.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueRangeDef {
    /// A fixed list of values.
    Explicit(Vec<Value>),
    /// Integers in `start..end`.
    IntRange { start: i64, end: i64 },
    /// References to every fact of the named class.
    FactClass(Arc<str>),
}

impl ValueRangeDef {
    pub fn from_ints(values: impl IntoIterator<Item = i64>) -> Self {
        ValueRangeDef::Explicit(values.into_iter().map(Value::Int).collect())
    }

    pub fn int_range(start: i64, end: i64) -> Self {
        ValueRangeDef::IntRange { start, end }
    }

    pub fn facts(class: impl Into<Arc<str>>) -> Self {
        ValueRangeDef::FactClass(class.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub value_range: ValueRangeDef,
    /// Whether the solver may leave this variable unassigned. An empty range
    /// is only legal when this is set.
    pub allows_unassigned: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: Arc<str>,
    pub variable: Option<VariableDef>,
}

impl FieldDef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            variable: None,
        }
    }

    pub fn planning_variable(name: impl Into<Arc<str>>, value_range: ValueRangeDef) -> Self {
        Self {
            name: name.into(),
            variable: Some(VariableDef {
                value_range,
                allows_unassigned: false,
            }),
        }
    }

    /// Marks a planning variable as allowed to stay unassigned.
    pub fn allows_unassigned(mut self) -> Self {
        if let Some(variable) = self.variable.as_mut() {
            variable.allows_unassigned = true;
        }
        self
    }

    pub fn is_planning_variable(&self) -> bool {
        self.variable.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactClassDef {
    pub name: Arc<str>,
    pub fields: Vec<FieldDef>,
}

impl FactClassDef {
    pub fn new<N: Into<Arc<str>>>(name: impl Into<Arc<str>>, fields: impl IntoIterator<Item = N>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(FieldDef::new).collect(),
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name.as_ref() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityClassDef {
    pub name: Arc<str>,
    pub fields: Vec<FieldDef>,
    pub planning_variable_indices: Vec<usize>,
}

impl EntityClassDef {
    pub fn new(name: impl Into<Arc<str>>, fields: Vec<FieldDef>) -> Self {
        let planning_variable_indices = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_planning_variable())
            .map(|(i, _)| i)
            .collect();
        Self {
            name: name.into(),
            fields,
            planning_variable_indices,
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name.as_ref() == name)
    }

    pub fn variables(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.planning_variable_indices.iter().map(|&i| FieldId(i))
    }
}

/// Schema of a problem: fact classes and entity classes.
///
/// Built once per problem type and shared by every instance of it.
///
/// # Example
///
/// ```
/// use plansmith_core::{EntityClassDef, FactClassDef, FieldDef, ProblemDescriptor, ValueRangeDef};
///
/// let descriptor = ProblemDescriptor::builder()
///     .fact_class(FactClassDef::new("Employee", ["name", "skills"]))
///     .entity_class(EntityClassDef::new(
///         "Shift",
///         vec![
///             FieldDef::new("required_skill"),
///             FieldDef::planning_variable("employee", ValueRangeDef::facts("Employee")),
///         ],
///     ))
///     .build()
///     .unwrap();
///
/// let employee = descriptor.field("Shift", "employee").unwrap();
/// assert_eq!(employee.index(), 1);
/// assert!(descriptor.field("Shift", "missing").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemDescriptor {
    fact_classes: Vec<FactClassDef>,
    entity_classes: Vec<EntityClassDef>,
    fact_class_indices: HashMap<Arc<str>, usize>,
    entity_class_indices: HashMap<Arc<str>, usize>,
}

impl ProblemDescriptor {
    pub fn builder() -> ProblemDescriptorBuilder {
        ProblemDescriptorBuilder::default()
    }

    pub fn fact_classes(&self) -> &[FactClassDef] {
        &self.fact_classes
    }

    pub fn entity_classes(&self) -> &[EntityClassDef] {
        &self.entity_classes
    }

    pub fn fact_class(&self, index: usize) -> Option<&FactClassDef> {
        self.fact_classes.get(index)
    }

    pub fn entity_class(&self, index: usize) -> Option<&EntityClassDef> {
        self.entity_classes.get(index)
    }

    pub fn fact_class_index(&self, name: &str) -> Result<usize, ModelError> {
        self.fact_class_indices
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownFactClass(name.to_string()))
    }

    pub fn entity_class_index(&self, name: &str) -> Result<usize, ModelError> {
        self.entity_class_indices
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownEntityClass(name.to_string()))
    }

    /// Resolves a field of a fact or entity class by name.
    pub fn field(&self, class: &str, field: &str) -> Result<FieldId, ModelError> {
        let index = if let Some(&idx) = self.entity_class_indices.get(class) {
            self.entity_classes[idx].field_index(field)
        } else if let Some(&idx) = self.fact_class_indices.get(class) {
            self.fact_classes[idx].field_index(field)
        } else {
            return Err(ModelError::UnknownClass(class.to_string()));
        };
        index.map(FieldId).ok_or_else(|| ModelError::UnknownField {
            class: class.to_string(),
            field: field.to_string(),
        })
    }

    /// Resolves a planning variable of an entity class by name.
    pub fn variable(&self, class: &str, field: &str) -> Result<(usize, FieldId), ModelError> {
        let class_idx = self.entity_class_index(class)?;
        let id = self.field(class, field)?;
        if self.entity_classes[class_idx].fields[id.0].is_planning_variable() {
            Ok((class_idx, id))
        } else {
            Err(ModelError::NotAVariable {
                class: class.to_string(),
                field: field.to_string(),
            })
        }
    }

    pub fn fact_class_name(&self, index: usize) -> &str {
        self.fact_classes.get(index).map_or("?", |c| c.name.as_ref())
    }

    pub fn entity_class_name(&self, index: usize) -> &str {
        self.entity_classes.get(index).map_or("?", |c| c.name.as_ref())
    }
}

#[derive(Debug, Default)]
pub struct ProblemDescriptorBuilder {
    fact_classes: Vec<FactClassDef>,
    entity_classes: Vec<EntityClassDef>,
}

impl ProblemDescriptorBuilder {
    pub fn fact_class(mut self, class: FactClassDef) -> Self {
        self.fact_classes.push(class);
        self
    }

    pub fn entity_class(mut self, class: EntityClassDef) -> Self {
        self.entity_classes.push(class);
        self
    }

    /// Validates class names and value range references.
    pub fn build(self) -> Result<ProblemDescriptor, ModelError> {
        let mut fact_class_indices = HashMap::new();
        let mut entity_class_indices = HashMap::new();

        for (i, class) in self.fact_classes.iter().enumerate() {
            if fact_class_indices.insert(class.name.clone(), i).is_some() {
                return Err(ModelError::DuplicateClass(class.name.to_string()));
            }
        }
        for (i, class) in self.entity_classes.iter().enumerate() {
            if fact_class_indices.contains_key(&class.name)
                || entity_class_indices.insert(class.name.clone(), i).is_some()
            {
                return Err(ModelError::DuplicateClass(class.name.to_string()));
            }
        }

        for class in &self.entity_classes {
            for field in &class.fields {
                if let Some(VariableDef {
                    value_range: ValueRangeDef::FactClass(target),
                    ..
                }) = &field.variable
                {
                    if !fact_class_indices.contains_key(target) {
                        return Err(ModelError::UnknownFactClass(target.to_string()));
                    }
                }
            }
        }

        Ok(ProblemDescriptor {
            fact_classes: self.fact_classes,
            entity_classes: self.entity_classes,
            fact_class_indices,
            entity_class_indices,
        })
    }
}
