//! Problem instances: facts, entities and the current score.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::ModelError;

use super::descriptor::{FieldId, ProblemDescriptor, ValueRangeDef};
use super::registry::{Fact, FactRegistry};
use super::row::{Row, RowKind};
use super::value::{FactKey, Value};

/// A mutable unit being optimized.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: i64,
    pub fields: Vec<Value>,
    /// A pinned entity keeps its planning variables as given.
    pub pinned: bool,
}

impl Entity {
    pub fn new(id: i64, fields: Vec<Value>) -> Self {
        Self {
            id,
            fields,
            pinned: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn get(&self, field: FieldId) -> Option<&Value> {
        self.fields.get(field.0)
    }
}

/// Address of an entity: class index and position within the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub class: usize,
    pub index: usize,
}

impl EntityRef {
    pub const fn new(class: usize, index: usize) -> Self {
        Self { class, index }
    }
}

/// Address of any element a constraint can match: a fact or an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRef {
    Fact { class: usize, index: usize },
    Entity(EntityRef),
}

impl From<EntityRef> for ElementRef {
    fn from(entity: EntityRef) -> Self {
        ElementRef::Entity(entity)
    }
}

/// Resolved value range of one planning variable.
///
/// Integer ranges stay as bounds; only listed values are materialized.
#[derive(Debug, Clone)]
pub struct Domain {
    values: DomainValues,
    allows_unassigned: bool,
}

#[derive(Debug, Clone)]
enum DomainValues {
    Listed { values: Vec<Value>, members: HashSet<Value> },
    Range { start: i64, end: i64 },
}

impl Domain {
    fn listed(values: Vec<Value>, allows_unassigned: bool) -> Self {
        let members = values.iter().cloned().collect();
        Self {
            values: DomainValues::Listed { values, members },
            allows_unassigned,
        }
    }

    fn range(start: i64, end: i64, allows_unassigned: bool) -> Self {
        Self {
            values: DomainValues::Range { start, end },
            allows_unassigned,
        }
    }

    /// Number of assignable values, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        match &self.values {
            DomainValues::Listed { values, .. } => values.len(),
            DomainValues::Range { start, end } if end > start => {
                usize::try_from(end.abs_diff(*start)).unwrap_or(usize::MAX)
            }
            DomainValues::Range { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `index` in declaration order.
    pub fn get(&self, index: usize) -> Option<Value> {
        match &self.values {
            DomainValues::Listed { values, .. } => values.get(index).cloned(),
            DomainValues::Range { start, end } => {
                let value = start.checked_add_unsigned(u64::try_from(index).ok()?)?;
                (value < *end).then_some(Value::Int(value))
            }
        }
    }

    /// Values in declaration order, produced on demand.
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map_while(move |index| self.get(index))
    }

    pub fn allows_unassigned(&self) -> bool {
        self.allows_unassigned
    }

    /// Whether a variable may hold `value`.
    pub fn contains(&self, value: &Value) -> bool {
        if value.is_none() {
            return self.allows_unassigned;
        }
        match &self.values {
            DomainValues::Listed { members, .. } => members.contains(value),
            DomainValues::Range { start, end } => {
                matches!(value, Value::Int(v) if (*start..*end).contains(v))
            }
        }
    }
}

/// An instance of a problem.
///
/// Holds the facts (shared, immutable), the entities and the score last
/// assigned to it. Cloning a problem copies the entities only, which is what
/// best-solution snapshots rely on.
#[derive(Debug, Clone)]
pub struct Problem<S> {
    descriptor: Arc<ProblemDescriptor>,
    facts: Arc<FactRegistry>,
    domains: Arc<Vec<Vec<Option<Domain>>>>,
    entities: Vec<Vec<Entity>>,
    score: Option<S>,
}

impl<S: Copy> Problem<S> {
    pub fn builder(descriptor: Arc<ProblemDescriptor>) -> ProblemBuilder<S> {
        ProblemBuilder::new(descriptor)
    }

    pub fn descriptor(&self) -> &Arc<ProblemDescriptor> {
        &self.descriptor
    }

    pub fn facts(&self) -> &FactRegistry {
        &self.facts
    }

    pub fn entity_class_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self, class: usize) -> &[Entity] {
        self.entities.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entity(&self, entity: EntityRef) -> Option<&Entity> {
        self.entities.get(entity.class)?.get(entity.index)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.iter().map(Vec::len).sum()
    }

    /// All entity addresses, class by class.
    pub fn entity_refs(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.entities.iter().enumerate().flat_map(|(class, entities)| {
            (0..entities.len()).map(move |index| EntityRef::new(class, index))
        })
    }

    /// Finds an entity by class and id.
    pub fn find_entity(&self, class: usize, id: i64) -> Option<EntityRef> {
        let index = self.entities(class).iter().position(|e| e.id == id)?;
        Some(EntityRef::new(class, index))
    }

    pub fn entity_row(&self, entity: EntityRef) -> Option<Row<'_>> {
        let e = self.entity(entity)?;
        Some(Row::new(
            RowKind::Entity(entity.class),
            e.id,
            &e.fields,
            &self.facts,
        ))
    }

    /// Row view of a fact or entity.
    pub fn row(&self, element: ElementRef) -> Option<Row<'_>> {
        match element {
            ElementRef::Fact { class, index } => self.facts.row(class, index),
            ElementRef::Entity(entity) => self.entity_row(entity),
        }
    }

    pub fn domain(&self, class: usize, field: FieldId) -> Option<&Domain> {
        self.domains.get(class)?.get(field.0)?.as_ref()
    }

    pub fn variable(&self, entity: EntityRef, field: FieldId) -> Option<&Value> {
        self.entity(entity)?.get(field)
    }

    /// True when every planning variable of the entity holds a value.
    pub fn is_assigned(&self, entity: EntityRef) -> bool {
        let (Some(e), Some(class)) = (
            self.entity(entity),
            self.descriptor.entity_class(entity.class),
        ) else {
            return false;
        };
        class
            .planning_variable_indices
            .iter()
            .all(|&i| e.fields.get(i).is_some_and(Value::is_some))
    }

    pub fn is_pinned(&self, entity: EntityRef) -> bool {
        self.entity(entity).is_some_and(|e| e.pinned)
    }

    pub fn score(&self) -> Option<S> {
        self.score
    }

    pub fn set_score(&mut self, score: Option<S>) {
        self.score = score;
    }

    /// Checks that assigning `value` to the variable leaves the problem valid.
    pub fn check_change(
        &self,
        entity: EntityRef,
        field: FieldId,
        value: &Value,
    ) -> Result<(), ModelError> {
        let class_name = self.descriptor.entity_class_name(entity.class).to_string();
        let e = self.entity(entity).ok_or(ModelError::EntityOutOfBounds {
            class: class_name.clone(),
            index: entity.index,
        })?;
        let variable_name = || {
            self.descriptor
                .entity_class(entity.class)
                .and_then(|c| c.fields.get(field.0))
                .map_or_else(|| format!("#{}", field.0), |f| f.name.to_string())
        };
        let domain = self
            .domain(entity.class, field)
            .ok_or_else(|| ModelError::NotAVariable {
                class: class_name.clone(),
                field: variable_name(),
            })?;
        if e.pinned {
            return Err(ModelError::PinnedEntity {
                class: class_name,
                id: e.id,
            });
        }
        if !domain.contains(value) {
            return Err(ModelError::ValueOutOfRange {
                class: class_name,
                id: e.id,
                variable: variable_name(),
                value: value.to_string(),
            });
        }
        Ok(())
    }

    /// Assigns a planning variable after validating the change.
    ///
    /// Returns the previous value.
    pub fn set_variable(
        &mut self,
        entity: EntityRef,
        field: FieldId,
        value: Value,
    ) -> Result<Value, ModelError> {
        self.check_change(entity, field, &value)?;
        let slot = &mut self.entities[entity.class][entity.index].fields[field.0];
        Ok(std::mem::replace(slot, value))
    }

    /// Puts back a value a variable held before a change.
    ///
    /// Skips the range check: an entity may start out unassigned even when
    /// its variable does not allow it, and reverting a move must restore
    /// that state. Pinned entities are still refused.
    pub fn restore_variable(
        &mut self,
        entity: EntityRef,
        field: FieldId,
        value: Value,
    ) -> Result<Value, ModelError> {
        let class_name = self.descriptor.entity_class_name(entity.class).to_string();
        if self.domain(entity.class, field).is_none() {
            return Err(ModelError::NotAVariable {
                class: class_name,
                field: format!("#{}", field.0),
            });
        }
        let e = self
            .entities
            .get_mut(entity.class)
            .and_then(|c| c.get_mut(entity.index))
            .ok_or(ModelError::EntityOutOfBounds {
                class: class_name.clone(),
                index: entity.index,
            })?;
        if e.pinned {
            return Err(ModelError::PinnedEntity {
                class: class_name,
                id: e.id,
            });
        }
        Ok(std::mem::replace(&mut e.fields[field.0], value))
    }
}

/// Collects facts and entities, then validates them into a [`Problem`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use plansmith_core::{
///     Entity, EntityClassDef, Fact, FactClassDef, FieldDef, HardSoftScore, Problem,
///     ProblemDescriptor, Value, ValueRangeDef,
/// };
///
/// let descriptor = Arc::new(
///     ProblemDescriptor::builder()
///         .fact_class(FactClassDef::new("Room", ["name"]))
///         .entity_class(EntityClassDef::new(
///             "Lesson",
///             vec![FieldDef::planning_variable("room", ValueRangeDef::facts("Room"))],
///         ))
///         .build()
///         .unwrap(),
/// );
///
/// let problem: Problem<HardSoftScore> = Problem::builder(descriptor)
///     .fact("Room", Fact::new(1, vec![Value::from("A")]))
///     .entity("Lesson", Entity::new(10, vec![Value::None]))
///     .build()
///     .unwrap();
///
/// assert_eq!(problem.entity_count(), 1);
/// ```
#[derive(Debug)]
pub struct ProblemBuilder<S> {
    descriptor: Arc<ProblemDescriptor>,
    facts: Vec<Vec<Fact>>,
    entities: Vec<Vec<Entity>>,
    error: Option<ModelError>,
    _score: std::marker::PhantomData<S>,
}

impl<S: Copy> ProblemBuilder<S> {
    pub fn new(descriptor: Arc<ProblemDescriptor>) -> Self {
        let facts = vec![Vec::new(); descriptor.fact_classes().len()];
        let entities = vec![Vec::new(); descriptor.entity_classes().len()];
        Self {
            descriptor,
            facts,
            entities,
            error: None,
            _score: std::marker::PhantomData,
        }
    }

    pub fn fact(mut self, class: &str, fact: Fact) -> Self {
        match self.descriptor.fact_class_index(class) {
            Ok(idx) => self.facts[idx].push(fact),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    pub fn facts(self, class: &str, facts: impl IntoIterator<Item = Fact>) -> Self {
        facts.into_iter().fold(self, |b, f| b.fact(class, f))
    }

    pub fn entity(mut self, class: &str, entity: Entity) -> Self {
        match self.descriptor.entity_class_index(class) {
            Ok(idx) => self.entities[idx].push(entity),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    pub fn entities(self, class: &str, entities: impl IntoIterator<Item = Entity>) -> Self {
        entities.into_iter().fold(self, |b, e| b.entity(class, e))
    }

    /// Validates ids, field counts, references and variable values.
    pub fn build(self) -> Result<Problem<S>, ModelError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let descriptor = self.descriptor;

        for (class, facts) in self.facts.iter().enumerate() {
            let def = &descriptor.fact_classes()[class];
            check_records(&def.name, def.fields.len(), facts.iter().map(|f| (f.id, f.fields.len())))?;
        }
        for (class, entities) in self.entities.iter().enumerate() {
            let def = &descriptor.entity_classes()[class];
            check_records(
                &def.name,
                def.fields.len(),
                entities.iter().map(|e| (e.id, e.fields.len())),
            )?;
        }

        let registry = FactRegistry::new(self.facts);
        let mut unresolved = None;
        let mut check = |key: FactKey| {
            if unresolved.is_none() && !registry.contains(key) {
                unresolved = Some(key);
            }
        };
        for class in 0..registry.class_count() {
            for fact in registry.facts(class) {
                fact.fields.iter().for_each(|v| v.for_each_fact_key(&mut check));
            }
        }
        for entity in self.entities.iter().flatten() {
            entity.fields.iter().for_each(|v| v.for_each_fact_key(&mut check));
        }
        if let Some(key) = unresolved {
            return Err(ModelError::UnresolvedReference {
                class: descriptor.fact_class_name(key.class).to_string(),
                id: key.id,
            });
        }

        let domains = resolve_domains(&descriptor, &registry)?;
        for (class, entities) in self.entities.iter().enumerate() {
            let def = &descriptor.entity_classes()[class];
            for entity in entities {
                for &var in &def.planning_variable_indices {
                    let value = &entity.fields[var];
                    let in_range = domains[class][var]
                        .as_ref()
                        .is_some_and(|d| value.is_none() || d.contains(value));
                    if !in_range {
                        return Err(ModelError::ValueOutOfRange {
                            class: def.name.to_string(),
                            id: entity.id,
                            variable: def.fields[var].name.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Problem {
            descriptor,
            facts: Arc::new(registry),
            domains: Arc::new(domains),
            entities: self.entities,
            score: None,
        })
    }
}

fn check_records(
    class: &str,
    expected: usize,
    records: impl Iterator<Item = (i64, usize)>,
) -> Result<(), ModelError> {
    let mut seen = HashMap::new();
    for (id, actual) in records {
        if actual != expected {
            return Err(ModelError::FieldCount {
                class: class.to_string(),
                id,
                expected,
                actual,
            });
        }
        if seen.insert(id, ()).is_some() {
            return Err(ModelError::DuplicateId {
                class: class.to_string(),
                id,
            });
        }
    }
    Ok(())
}

fn resolve_domains(
    descriptor: &ProblemDescriptor,
    registry: &FactRegistry,
) -> Result<Vec<Vec<Option<Domain>>>, ModelError> {
    let mut domains = Vec::with_capacity(descriptor.entity_classes().len());
    for class in descriptor.entity_classes() {
        let mut per_field = Vec::with_capacity(class.fields.len());
        for field in &class.fields {
            let Some(variable) = &field.variable else {
                per_field.push(None);
                continue;
            };
            let allows_unassigned = variable.allows_unassigned;
            let domain = match &variable.value_range {
                ValueRangeDef::Explicit(values) => Domain::listed(values.clone(), allows_unassigned),
                ValueRangeDef::IntRange { start, end } => Domain::range(*start, *end, allows_unassigned),
                ValueRangeDef::FactClass(name) => {
                    let fact_class = descriptor.fact_class_index(name)?;
                    let values = registry
                        .facts(fact_class)
                        .iter()
                        .map(|f| Value::fact(fact_class, f.id))
                        .collect();
                    Domain::listed(values, allows_unassigned)
                }
            };
            if domain.is_empty() && !allows_unassigned {
                return Err(ModelError::EmptyValueRange {
                    class: class.name.to_string(),
                    variable: field.name.to_string(),
                });
            }
            per_field.push(Some(domain));
        }
        domains.push(per_field);
    }
    Ok(domains)
}
