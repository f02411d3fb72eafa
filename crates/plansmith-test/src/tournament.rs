//! Tournament scheduling fixtures.
//!
//! Each day has a fixed number of slots and the solver assigns a team to
//! every slot. A team plays at most once a day and never on a day it is
//! unavailable; the number of slots per team and the number of times two
//! teams share a day should both be balanced. Some slots come pinned.

use std::sync::Arc;

use plansmith_core::{
    Entity, EntityClassDef, Fact, FactClassDef, FieldDef, FieldId, HardMediumSoftDecimalScore,
    Problem, ProblemBuilder, ProblemDescriptor, Value, ValueRangeDef,
};
use plansmith_scoring::collector::load_balance;
use plansmith_scoring::joiner::{equal, less_than};
use plansmith_scoring::{Constraint, ConstraintFactory, ConstraintGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type Score = HardMediumSoftDecimalScore;

pub const TEAM: &str = "Team";
pub const DAY: &str = "Day";
pub const UNAVAILABILITY: &str = "UnavailabilityPenalty";
pub const ASSIGNMENT: &str = "TeamAssignment";

const TEAM_CLASS: usize = 0;
const DAY_CLASS: usize = 1;

pub fn descriptor() -> Arc<ProblemDescriptor> {
    Arc::new(
        ProblemDescriptor::builder()
            .fact_class(FactClassDef::new(TEAM, ["name"]))
            .fact_class(FactClassDef::new(DAY, ["date_index"]))
            .fact_class(FactClassDef::new(UNAVAILABILITY, ["team", "day"]))
            .entity_class(EntityClassDef::new(
                ASSIGNMENT,
                vec![
                    FieldDef::new("day"),
                    FieldDef::new("index_in_day"),
                    FieldDef::planning_variable("team", ValueRangeDef::facts(TEAM)),
                ],
            ))
            .build()
            .expect("tournament descriptor is valid"),
    )
}

pub fn builder() -> ProblemBuilder<Score> {
    Problem::builder(descriptor())
}

pub fn constraint_graph(descriptor: Arc<ProblemDescriptor>) -> Arc<ConstraintGraph<Score>> {
    Arc::new(
        ConstraintGraph::build(descriptor, define_constraints)
            .expect("tournament constraints are valid"),
    )
}

pub fn team(id: i64, name: &str) -> Fact {
    Fact::new(id, vec![Value::from(name)])
}

pub fn day(id: i64) -> Fact {
    Fact::new(id, vec![Value::Int(id)])
}

pub fn unavailability(id: i64, team: i64, day: i64) -> Fact {
    Fact::new(id, vec![team_ref(Some(team)), Value::fact(DAY_CLASS, day)])
}

pub fn slot(id: i64, day: i64, index_in_day: i64, team: Option<i64>) -> Entity {
    Entity::new(
        id,
        vec![Value::fact(DAY_CLASS, day), Value::Int(index_in_day), team_ref(team)],
    )
}

pub fn team_ref(team: Option<i64>) -> Value {
    team.map_or(Value::None, |id| Value::fact(TEAM_CLASS, id))
}

/// A seeded instance with `days * per_day` slots over `teams` teams.
///
/// The first slot of every fourth day is pinned to a team; the remaining
/// slots start empty. Each team is unavailable on roughly one day in six.
pub fn generate(seed: u64, teams: usize, days: usize, per_day: usize) -> Problem<Score> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = builder();
    for id in 0..teams as i64 {
        builder = builder.fact(TEAM, team(id, &format!("Team {id}")));
    }
    for id in 0..days as i64 {
        builder = builder.fact(DAY, day(id));
    }

    let mut penalty = 0;
    for t in 0..teams as i64 {
        for d in 0..days as i64 {
            if rng.random_bool(1.0 / 6.0) {
                builder = builder.fact(UNAVAILABILITY, unavailability(penalty, t, d));
                penalty += 1;
            }
        }
    }

    let mut id = 0;
    for d in 0..days as i64 {
        for index in 0..per_day as i64 {
            let entity = if index == 0 && d % 4 == 0 && teams > 0 {
                slot(id, d, index, Some(rng.random_range(0..teams as i64))).pinned()
            } else {
                slot(id, d, index, None)
            };
            builder = builder.entity(ASSIGNMENT, entity);
            id += 1;
        }
    }
    builder.build().expect("generated tournament problem is valid")
}

#[derive(Debug, Clone, Copy)]
struct Fields {
    day: FieldId,
    team: FieldId,
    unavailable_team: FieldId,
    unavailable_day: FieldId,
}

impl Fields {
    fn new(factory: &ConstraintFactory<Score>) -> Self {
        Self {
            day: factory.field(ASSIGNMENT, "day"),
            team: factory.field(ASSIGNMENT, "team"),
            unavailable_team: factory.field(UNAVAILABILITY, "team"),
            unavailable_day: factory.field(UNAVAILABILITY, "day"),
        }
    }
}

pub fn define_constraints(factory: &ConstraintFactory<Score>) -> Vec<Constraint<Score>> {
    vec![
        one_assignment_per_date_per_team(factory),
        unavailability_penalty(factory),
        fair_assignment_count_per_team(factory),
        evenly_confrontation_count(factory),
    ]
}

pub fn one_assignment_per_date_per_team(factory: &ConstraintFactory<Score>) -> Constraint<Score> {
    let f = Fields::new(factory);
    factory
        .for_each_unique_pair(
            ASSIGNMENT,
            vec![
                equal(move |t| t.row(0).get(f.team).clone(), move |r| r.get(f.team).clone()),
                equal(move |t| t.row(0).get(f.day).clone(), move |r| r.get(f.day).clone()),
            ],
        )
        .penalize(Score::ONE_HARD)
        .as_constraint("oneAssignmentPerDatePerTeam")
}

pub fn unavailability_penalty(factory: &ConstraintFactory<Score>) -> Constraint<Score> {
    let f = Fields::new(factory);
    factory
        .for_each(UNAVAILABILITY)
        .if_exists(
            ASSIGNMENT,
            vec![
                equal(
                    move |t| t.row(0).get(f.unavailable_team).clone(),
                    move |r| r.get(f.team).clone(),
                ),
                equal(
                    move |t| t.row(0).get(f.unavailable_day).clone(),
                    move |r| r.get(f.day).clone(),
                ),
            ],
        )
        .penalize(Score::ONE_HARD)
        .as_constraint("unavailabilityPenalty")
}

pub fn fair_assignment_count_per_team(factory: &ConstraintFactory<Score>) -> Constraint<Score> {
    let f = Fields::new(factory);
    factory
        .for_each(ASSIGNMENT)
        .group(load_balance(move |t| t.row(0).get(f.team).clone(), |_| 1))
        .penalize_decimal_with(Score::ONE_MEDIUM, |_, balance| balance.unfairness())
        .justify_with(|_, balance| format!("unfairness {}", balance.unfairness()))
        .as_constraint("fairAssignmentCountPerTeam")
}

pub fn evenly_confrontation_count(factory: &ConstraintFactory<Score>) -> Constraint<Score> {
    let f = Fields::new(factory);
    factory
        .for_each(ASSIGNMENT)
        .join(
            ASSIGNMENT,
            vec![
                equal(move |t| t.row(0).get(f.day).clone(), move |r| r.get(f.day).clone()),
                less_than(move |t| t.row(0).get(f.team).clone(), move |r| r.get(f.team).clone()),
            ],
        )
        .group(load_balance(
            move |t| Value::List(vec![t.row(0).get(f.team).clone(), t.row(1).get(f.team).clone()]),
            |_| 1,
        ))
        .penalize_decimal_with(Score::ONE_SOFT, |_, balance| balance.unfairness())
        .justify_with(|_, balance| format!("unfairness {}", balance.unfairness()))
        .as_constraint("evenlyConfrontationCount")
}
