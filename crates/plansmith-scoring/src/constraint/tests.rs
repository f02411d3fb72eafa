use std::sync::Arc;

use plansmith_core::{
    Entity, EntityClassDef, Fact, FactClassDef, FieldDef, HardSoftScore, ModelError, Problem,
    ProblemDescriptor, Value, ValueRangeDef,
};

use super::*;
use crate::stream::collector::count;
use crate::stream::joiner::{equal, overlapping};

fn descriptor() -> Arc<ProblemDescriptor> {
    Arc::new(
        ProblemDescriptor::builder()
            .fact_class(FactClassDef::new("Employee", ["name", "skills"]))
            .entity_class(EntityClassDef::new(
                "Shift",
                vec![
                    FieldDef::new("start"),
                    FieldDef::new("end"),
                    FieldDef::new("skill"),
                    FieldDef::planning_variable("employee", ValueRangeDef::facts("Employee"))
                        .allows_unassigned(),
                ],
            ))
            .build()
            .unwrap(),
    )
}

/// Employees 1 (cook) and 2 (waiter); shifts as `(start, end, skill, employee)`.
fn problem(shifts: &[(i64, i64, &str, Option<i64>)]) -> Problem<HardSoftScore> {
    let builder = Problem::builder(descriptor())
        .fact(
            "Employee",
            Fact::new(1, vec![Value::from("Ann"), Value::List(vec![Value::from("cook")])]),
        )
        .fact(
            "Employee",
            Fact::new(2, vec![Value::from("Bo"), Value::List(vec![Value::from("waiter")])]),
        );
    shifts
        .iter()
        .enumerate()
        .fold(builder, |b, (i, &(start, end, skill, employee))| {
            b.entity(
                "Shift",
                Entity::new(
                    i as i64,
                    vec![
                        Value::Int(start),
                        Value::Int(end),
                        Value::from(skill),
                        employee.map_or(Value::None, |id| Value::fact(0, id)),
                    ],
                ),
            )
        })
        .build()
        .unwrap()
}

fn missing_skill(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let skill = factory.field("Shift", "skill");
    let employee = factory.field("Shift", "employee");
    let skills = factory.field("Employee", "skills");
    factory
        .for_each("Shift")
        .filter(move |t| {
            let shift = t.row(0);
            shift
                .resolve(employee)
                .is_some_and(|e| !e.list(skills).contains(shift.get(skill)))
        })
        .penalize(HardSoftScore::of_hard(100))
        .as_constraint("Missing skill")
}

fn overlap(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let start = factory.field("Shift", "start");
    let end = factory.field("Shift", "end");
    let employee = factory.field("Shift", "employee");
    factory
        .for_each_unique_pair(
            "Shift",
            vec![
                equal(
                    move |t| t.row(0).get(employee).clone(),
                    move |r| r.get(employee).clone(),
                ),
                overlapping(
                    move |t| t.row(0).get(start).clone(),
                    move |t| t.row(0).get(end).clone(),
                    move |r| r.get(start).clone(),
                    move |r| r.get(end).clone(),
                ),
            ],
        )
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Overlap")
}

fn graph<F>(provider: F) -> ConstraintGraph<HardSoftScore>
where
    F: FnOnce(&ConstraintFactory<HardSoftScore>) -> Vec<Constraint<HardSoftScore>>,
{
    ConstraintGraph::build(descriptor(), provider).unwrap()
}

#[test]
fn test_filter_penalizes_each_match() {
    let g = graph(|f| vec![missing_skill(f)]);
    let p = problem(&[(0, 1, "cook", Some(2)), (0, 1, "cook", Some(1)), (0, 1, "waiter", Some(1))]);
    assert_eq!(g.evaluate(&p), HardSoftScore::of_hard(-200));
}

#[test]
fn test_unassigned_entities_are_skipped() {
    let g = graph(|f| vec![missing_skill(f)]);
    let p = problem(&[(0, 1, "cook", None), (0, 1, "waiter", None)]);
    assert_eq!(g.evaluate(&p), HardSoftScore::ZERO);
}

#[test]
fn test_unique_pair_counts_each_pair_once() {
    let g = graph(|f| vec![overlap(f)]);
    let p = problem(&[
        (0, 10, "cook", Some(1)),
        (5, 15, "cook", Some(1)),
        (8, 12, "cook", Some(1)),
        (0, 10, "cook", Some(2)),
    ]);
    // (0,1), (0,2), (1,2); shift 3 has another employee
    assert_eq!(g.evaluate(&p), HardSoftScore::of_hard(-3));
}

#[test]
fn test_join_to_facts_by_reference() {
    let g = graph(|f| {
        let employee = f.field("Shift", "employee");
        vec![f
            .for_each("Shift")
            .join(
                "Employee",
                vec![equal(
                    move |t| t.row(0).get(employee).clone(),
                    |r| r.identity(),
                )],
            )
            .filter(|t| t.row(1).id() == 2)
            .penalize(HardSoftScore::ONE_SOFT)
            .as_constraint("Bo works")]
    });
    let p = problem(&[(0, 1, "cook", Some(2)), (0, 1, "cook", Some(2)), (0, 1, "cook", Some(1))]);
    assert_eq!(g.evaluate(&p), HardSoftScore::of_soft(-2));
}

#[test]
fn test_if_exists_and_if_not_exists() {
    let g = graph(|f| {
        let employee = f.field("Shift", "employee");
        let same_employee_later = move || {
            vec![
                equal(move |t| t.row(0).identity(), move |r| r.get(employee).clone()),
            ]
        };
        vec![
            f.for_each("Employee")
                .if_exists("Shift", same_employee_later())
                .penalize(HardSoftScore::ONE_SOFT)
                .as_constraint("Employee used"),
            f.for_each("Employee")
                .if_not_exists("Shift", same_employee_later())
                .penalize(HardSoftScore::ONE_HARD)
                .as_constraint("Employee idle"),
        ]
    });
    let p = problem(&[(0, 1, "cook", Some(1)), (2, 3, "cook", Some(1))]);
    let explanation = g.explain(&p);
    assert_eq!(explanation.constraint("Employee used").unwrap().match_count(), 1);
    assert_eq!(explanation.constraint("Employee idle").unwrap().match_count(), 1);
    assert_eq!(explanation.score, HardSoftScore::of(-1, -1));
}

#[test]
fn test_group_by_count() {
    let g = graph(|f| {
        let employee = f.field("Shift", "employee");
        vec![f
            .for_each("Shift")
            .group_by(move |t| t.row(0).get(employee).clone(), count())
            .filter(|_, &n| n > 1)
            .penalize_with(HardSoftScore::ONE_SOFT, |_, &n| n as i64 - 1)
            .as_constraint("Extra shifts")]
    });
    let p = problem(&[
        (0, 1, "cook", Some(1)),
        (1, 2, "cook", Some(1)),
        (2, 3, "cook", Some(1)),
        (0, 1, "cook", Some(2)),
    ]);
    assert_eq!(g.evaluate(&p), HardSoftScore::of_soft(-2));
}

#[test]
fn test_reward_adds_score() {
    let g = graph(|f| {
        vec![f
            .for_each("Shift")
            .reward_with(HardSoftScore::ONE_SOFT, |t| t.row(0).id() + 1)
            .as_constraint("Reward")]
    });
    let p = problem(&[(0, 1, "cook", Some(1)), (0, 1, "cook", Some(1))]);
    assert_eq!(g.evaluate(&p), HardSoftScore::of_soft(3));
}

#[test]
fn test_unknown_names_fail_at_build() {
    let err = ConstraintGraph::<HardSoftScore>::build(descriptor(), |f| {
        vec![f
            .for_each("Nope")
            .penalize(HardSoftScore::ONE_HARD)
            .as_constraint("Bad")]
    })
    .unwrap_err();
    assert_eq!(
        err,
        GraphError::InConstraint {
            constraint: "Bad".to_string(),
            source: ModelError::UnknownClass("Nope".to_string()),
        }
    );

    let err = ConstraintGraph::<HardSoftScore>::build(descriptor(), |f| {
        let missing = f.field("Shift", "colour");
        vec![f
            .for_each("Shift")
            .filter(move |t| t.row(0).get(missing).is_some())
            .penalize(HardSoftScore::ONE_HARD)
            .as_constraint("Bad field")]
    })
    .unwrap_err();
    assert!(matches!(
        err,
        GraphError::Model(ModelError::UnknownField { .. })
    ));
}

#[test]
fn test_duplicate_and_zero_weight_rejected() {
    let err = ConstraintGraph::build(descriptor(), |f| vec![overlap(f), overlap(f)]).unwrap_err();
    assert_eq!(err, GraphError::DuplicateConstraint("Overlap".to_string()));

    let err = ConstraintGraph::<HardSoftScore>::build(descriptor(), |f| {
        vec![f
            .for_each("Shift")
            .penalize(HardSoftScore::ZERO)
            .as_constraint("Nothing")]
    })
    .unwrap_err();
    assert_eq!(err, GraphError::ZeroWeight("Nothing".to_string()));
}

#[test]
fn test_weight_overrides() {
    let g = graph(|f| vec![missing_skill(f), overlap(f)]);
    let p = problem(&[(0, 10, "waiter", Some(1)), (5, 15, "cook", Some(1))]);
    assert_eq!(g.evaluate(&p), HardSoftScore::of_hard(-101));

    let mut overrides = ConstraintWeightOverrides::new();
    overrides.put("Missing skill", HardSoftScore::of_soft(7));
    let reweighted = g.with_overrides(&overrides).unwrap();
    assert_eq!(reweighted.evaluate(&p), HardSoftScore::of(-1, -7));

    overrides.put("Overlap", HardSoftScore::ZERO);
    let disabled = g.with_overrides(&overrides).unwrap();
    assert_eq!(disabled.len(), 1);
    assert_eq!(disabled.evaluate(&p), HardSoftScore::of_soft(-7));

    let unknown = ConstraintWeightOverrides::from_pairs([("Nope", HardSoftScore::ONE_HARD)]);
    assert_eq!(
        g.with_overrides(&unknown).unwrap_err(),
        GraphError::UnknownConstraint("Nope".to_string())
    );
}

#[test]
fn test_is_hard_and_describe() {
    let g = graph(|f| {
        vec![
            overlap(f),
            f.for_each("Shift")
                .penalize(HardSoftScore::ONE_SOFT)
                .as_constraint_in("rostering", "Any shift"),
        ]
    });
    assert!(g.constraint("Overlap").unwrap().is_hard());
    assert!(!g.constraint("rostering/Any shift").unwrap().is_hard());

    let lines = g.describe();
    assert!(lines[0].starts_with("Overlap"));
    assert!(lines[0].contains("join(Shift)[equal, overlapping, less_than]"));
    assert!(lines[1].contains("for_each(Shift)"));
}
