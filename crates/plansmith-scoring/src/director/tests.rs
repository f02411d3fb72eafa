use std::sync::Arc;

use plansmith_core::{
    Entity, EntityClassDef, EntityRef, Fact, FactClassDef, FieldDef, FieldId, HardSoftScore,
    ModelError, Problem, ProblemDescriptor, Value, ValueRangeDef,
};

use super::*;
use crate::stream::collector::count;
use crate::stream::joiner::{equal, overlapping};

const EMPLOYEE: FieldId = FieldId(2);

fn descriptor() -> Arc<ProblemDescriptor> {
    Arc::new(
        ProblemDescriptor::builder()
            .fact_class(FactClassDef::new("Employee", ["name"]))
            .entity_class(EntityClassDef::new(
                "Shift",
                vec![
                    FieldDef::new("start"),
                    FieldDef::new("end"),
                    FieldDef::planning_variable("employee", ValueRangeDef::facts("Employee"))
                        .allows_unassigned(),
                ],
            ))
            .build()
            .unwrap(),
    )
}

fn graph(descriptor: Arc<ProblemDescriptor>) -> Arc<ConstraintGraph<HardSoftScore>> {
    let graph = ConstraintGraph::build(descriptor, |f| {
        let start = f.field("Shift", "start");
        let end = f.field("Shift", "end");
        let employee = f.field("Shift", "employee");
        let same_employee = move || {
            equal(
                move |t| t.row(0).get(employee).clone(),
                move |r| r.get(employee).clone(),
            )
        };
        vec![
            f.for_each_unique_pair(
                "Shift",
                vec![
                    same_employee(),
                    overlapping(
                        move |t| t.row(0).get(start).clone(),
                        move |t| t.row(0).get(end).clone(),
                        move |r| r.get(start).clone(),
                        move |r| r.get(end).clone(),
                    ),
                ],
            )
            .penalize(HardSoftScore::ONE_HARD)
            .as_constraint("Overlap"),
            f.for_each("Employee")
                .if_not_exists(
                    "Shift",
                    vec![equal(|t| t.row(0).identity(), move |r| r.get(employee).clone())],
                )
                .penalize(HardSoftScore::of_soft(10))
                .as_constraint("Idle employee"),
            f.for_each("Shift")
                .group_by(move |t| t.row(0).get(employee).clone(), count())
                .penalize_with(HardSoftScore::ONE_SOFT, |_, &n| (n * n) as i64)
                .as_constraint("Load"),
            f.for_each_including_unassigned("Shift")
                .filter(move |t| t.row(0).get(employee).is_none())
                .penalize(HardSoftScore::of_hard(5))
                .as_constraint("Unassigned"),
        ]
    })
    .unwrap();
    Arc::new(graph)
}

fn problem(shifts: &[(i64, i64, Option<i64>)], pinned: &[usize]) -> Problem<HardSoftScore> {
    let builder = Problem::builder(descriptor())
        .fact("Employee", Fact::new(1, vec![Value::from("Ann")]))
        .fact("Employee", Fact::new(2, vec![Value::from("Bo")]))
        .fact("Employee", Fact::new(3, vec![Value::from("Cy")]));
    shifts
        .iter()
        .enumerate()
        .fold(builder, |b, (i, &(start, end, employee))| {
            let entity = Entity::new(
                i as i64,
                vec![
                    Value::Int(start),
                    Value::Int(end),
                    employee.map_or(Value::None, |id| Value::fact(0, id)),
                ],
            );
            b.entity("Shift", if pinned.contains(&i) { entity.pinned() } else { entity })
        })
        .build()
        .unwrap()
}

fn director(problem: Problem<HardSoftScore>) -> ScoreDirector<HardSoftScore> {
    let graph = graph(Arc::clone(problem.descriptor()));
    ScoreDirector::new(problem, graph).unwrap()
}

fn shift(index: usize) -> EntityRef {
    EntityRef::new(0, index)
}

fn employee(id: i64) -> Value {
    Value::fact(0, id)
}

#[test]
fn test_initial_score_matches_full_recompute() {
    let mut d = director(problem(&[(0, 10, Some(1)), (5, 15, Some(1)), (20, 30, None)], &[]));
    let score = d.calculate_score();
    // overlap -1hard, unassigned -5hard, load 2^2 = -4soft, idle Bo and Cy -20soft
    assert_eq!(score, HardSoftScore::of(-6, -24));
    assert_eq!(score, d.full_score());
    assert!(d.is_initialized());
    assert_eq!(d.working_solution().score(), Some(score));
}

#[test]
fn test_changes_are_tracked_incrementally() {
    let mut d = director(problem(&[(0, 10, Some(1)), (5, 15, Some(1)), (20, 30, None)], &[]));
    d.calculate_score();

    let previous = d.change_variable(shift(1), EMPLOYEE, employee(2)).unwrap();
    assert_eq!(previous, employee(1));
    assert_eq!(d.calculate_score(), d.full_score());
    assert_eq!(d.get_score(), HardSoftScore::of(-5, -12));

    d.change_variable(shift(2), EMPLOYEE, employee(3)).unwrap();
    assert_eq!(d.calculate_score(), HardSoftScore::of_soft(-3));
    assert_eq!(d.assert_consistent(), Ok(HardSoftScore::of_soft(-3)));

    d.change_variable(shift(0), EMPLOYEE, Value::None).unwrap();
    assert_eq!(d.calculate_score(), d.full_score());
}

#[test]
fn test_existence_follows_changes() {
    let mut d = director(problem(&[(0, 10, Some(1))], &[]));
    d.calculate_score();
    let idle = |d: &mut ScoreDirector<HardSoftScore>| {
        d.match_counts()
            .into_iter()
            .find(|(name, _)| name == "Idle employee")
            .map(|(_, n)| n)
    };
    assert_eq!(idle(&mut d), Some(2));

    d.change_variable(shift(0), EMPLOYEE, employee(2)).unwrap();
    assert_eq!(idle(&mut d), Some(2));
    d.change_variable(shift(0), EMPLOYEE, Value::None).unwrap();
    assert_eq!(idle(&mut d), Some(3));
    assert_eq!(d.calculate_score(), d.full_score());
}

#[test]
fn test_pinned_entity_is_rejected() {
    let mut d = director(problem(&[(0, 10, Some(1)), (5, 15, Some(2))], &[0]));
    let before = d.calculate_score();

    let err = d.change_variable(shift(0), EMPLOYEE, employee(2)).unwrap_err();
    assert_eq!(
        err,
        ScoreDirectorError::Model(ModelError::PinnedEntity {
            class: "Shift".to_string(),
            id: 0,
        })
    );
    assert_eq!(d.calculate_score(), before);
    assert_eq!(d.working_solution().variable(shift(0), EMPLOYEE), Some(&employee(1)));
}

#[test]
fn test_out_of_range_value_is_rejected() {
    let mut d = director(problem(&[(0, 10, Some(1))], &[]));
    let before = d.calculate_score();

    let err = d.change_variable(shift(0), EMPLOYEE, employee(9)).unwrap_err();
    assert!(matches!(err, ScoreDirectorError::Model(ModelError::ValueOutOfRange { .. })));
    let err = d.change_variable(shift(0), FieldId(0), Value::Int(3)).unwrap_err();
    assert!(matches!(err, ScoreDirectorError::Model(ModelError::NotAVariable { .. })));
    assert_eq!(d.calculate_score(), before);
    assert_eq!(d.assert_consistent(), Ok(before));
}

#[test]
fn test_full_recompute_mode_agrees() {
    let p = problem(&[(0, 10, Some(1)), (5, 15, Some(1)), (20, 30, None)], &[]);
    let graph = graph(Arc::clone(p.descriptor()));
    let mut incremental = ScoreDirector::new(p.clone(), Arc::clone(&graph)).unwrap();
    let mut full = ScoreDirector::with_mode(p, graph, ScoreMode::FullRecompute).unwrap();
    assert_eq!(full.mode(), ScoreMode::FullRecompute);

    for (index, value) in [(0, employee(3)), (2, employee(1)), (1, Value::None)] {
        incremental.change_variable(shift(index), EMPLOYEE, value.clone()).unwrap();
        full.change_variable(shift(index), EMPLOYEE, value).unwrap();
        assert_eq!(incremental.calculate_score(), full.calculate_score());
    }
    assert_eq!(full.match_counts(), incremental.match_counts());
}

#[test]
fn test_changes_before_first_calculation() {
    let mut d = director(problem(&[(0, 10, None), (5, 15, None)], &[]));
    d.change_variable(shift(0), EMPLOYEE, employee(1)).unwrap();
    d.change_variable(shift(1), EMPLOYEE, employee(1)).unwrap();
    assert!(!d.is_initialized());
    assert_eq!(d.calculate_score(), d.full_score());
}

#[test]
fn test_undo_restores_previous_state() {
    let mut d = director(problem(&[(0, 10, None), (5, 15, Some(1))], &[1]));
    let before = d.calculate_score();

    let previous = d.change_variable(shift(0), EMPLOYEE, employee(1)).unwrap();
    assert_ne!(d.calculate_score(), before);
    d.undo_change(shift(0), EMPLOYEE, previous).unwrap();
    assert_eq!(d.calculate_score(), before);
    assert_eq!(d.working_solution().variable(shift(0), EMPLOYEE), Some(&Value::None));

    let err = d.undo_change(shift(1), EMPLOYEE, Value::None).unwrap_err();
    assert!(matches!(err, ScoreDirectorError::Model(ModelError::PinnedEntity { .. })));
    assert_eq!(d.assert_consistent(), Ok(before));
}

#[test]
fn test_reset_rebuilds_memory() {
    let mut d = director(problem(&[(0, 10, Some(1)), (5, 15, Some(1))], &[]));
    let score = d.calculate_score();
    d.reset();
    assert!(!d.is_initialized());
    assert_eq!(d.get_score(), HardSoftScore::ZERO);
    assert_eq!(d.calculate_score(), score);
}

#[test]
fn test_snapshots_carry_score() {
    let mut d = director(problem(&[(0, 10, Some(1))], &[]));
    let snapshot = d.clone_working_solution();
    assert_eq!(snapshot.score(), Some(HardSoftScore::of_soft(-21)));

    d.change_variable(shift(0), EMPLOYEE, employee(2)).unwrap();
    assert_eq!(snapshot.variable(shift(0), EMPLOYEE), Some(&employee(1)));
    assert_eq!(d.working_solution().score(), None);

    let solution = d.take_solution();
    assert_eq!(solution.score(), Some(HardSoftScore::of_soft(-21)));
}

#[test]
fn test_explain_is_read_only() {
    let mut d = director(problem(&[(0, 10, Some(1)), (5, 15, Some(1))], &[]));
    let score = d.calculate_score();
    let explanation = d.explain();
    assert_eq!(explanation.score, score);
    assert_eq!(explanation.constraint("Overlap").unwrap().match_count(), 1);
    assert_eq!(d.calculate_score(), score);
}

#[test]
fn test_descriptor_mismatch() {
    let p = problem(&[(0, 10, Some(1))], &[]);
    let other = Arc::new(
        ProblemDescriptor::builder()
            .fact_class(FactClassDef::new("Employee", ["name"]))
            .entity_class(EntityClassDef::new(
                "Shift",
                vec![FieldDef::planning_variable("employee", ValueRangeDef::facts("Employee"))],
            ))
            .build()
            .unwrap(),
    );
    let graph = Arc::new(ConstraintGraph::<HardSoftScore>::build(other, |_| Vec::new()).unwrap());
    assert_eq!(
        ScoreDirector::new(p, graph).unwrap_err(),
        ScoreDirectorError::DescriptorMismatch
    );
}
