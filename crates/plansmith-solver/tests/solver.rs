//! Configured solves over the fixture domains.

use std::sync::Arc;
use std::time::{Duration, Instant};

use plansmith_config::SolverConfig;
use plansmith_core::{
    Entity, EntityClassDef, FieldDef, HardSoftScore, Problem, ProblemDescriptor, Score, Value, ValueRangeDef,
};
use plansmith_scoring::{ConstraintFactory, ConstraintGraph};
use plansmith_solver::{Solver, SolverState};
use plansmith_test::{sports_league, tournament};

const TOURNAMENT_CONFIG: &str = r#"
    environment_mode = "full_assert"
    random_seed = 5

    [termination]
    step_count_limit = 150

    [[phases]]
    type = "construction_heuristic"
    construction_heuristic_type = "first_fit"

    [[phases]]
    type = "local_search"
    step_count_limit = 40
    [phases.acceptor]
    type = "tabu_search"
    tabu_size = 3

    [[phases]]
    type = "local_search"
    [phases.acceptor]
    type = "simulated_annealing"
    decay_rate = 0.99
    [phases.move_selector]
    type = "change_move_selector"
    entity_class = "TeamAssignment"
"#;

fn assigned_values<S: Score>(problem: &Problem<S>, class: &str, field: &str) -> Vec<Value> {
    let (_, field) = problem.descriptor().variable(class, field).unwrap();
    problem
        .entity_refs()
        .map(|e| problem.variable(e, field).cloned().unwrap())
        .collect()
}

#[test]
fn test_tournament_solve_keeps_pinned_slots() {
    let problem = tournament::generate(8, 6, 12, 3);
    let before = assigned_values(&problem, tournament::ASSIGNMENT, "team");
    let pinned: Vec<bool> = problem.entity_refs().map(|e| problem.is_pinned(e)).collect();
    assert!(pinned.iter().any(|&p| p));

    let config = SolverConfig::from_toml_str(TOURNAMENT_CONFIG).unwrap();
    let graph = tournament::constraint_graph(Arc::clone(problem.descriptor()));
    let mut solver = Solver::new(graph, config).unwrap();
    let result = solver.solve(problem).unwrap();

    assert_eq!(solver.state(), SolverState::Terminated);
    assert!(result.stats.step_count <= 150);
    assert_eq!(solver.graph().evaluate(&result.solution), result.score);

    let after = assigned_values(&result.solution, tournament::ASSIGNMENT, "team");
    for ((before, after), pinned) in before.iter().zip(&after).zip(&pinned) {
        if *pinned {
            assert_eq!(before, after);
        }
        assert!(!after.is_none());
    }
}

#[test]
fn test_sports_league_hill_climbing_from_yaml() {
    let yaml = r#"
        random_seed: 2
        termination:
          unimproved_step_count_limit: 200
          step_count_limit: 2000
        phases:
          - type: construction_heuristic
          - type: local_search
            acceptor:
              type: hill_climbing
            forager:
              accepted_count_limit: 4
    "#;
    let problem = sports_league::generate(1, 6);
    let constructed = {
        let problem = problem.clone();
        let graph = sports_league::constraint_graph(Arc::clone(problem.descriptor()));
        let config = SolverConfig::from_yaml_str("phases:\n  - type: construction_heuristic\n").unwrap();
        Solver::new(graph, config.with_random_seed(2)).unwrap().solve(problem).unwrap()
    };

    let graph = sports_league::constraint_graph(Arc::clone(problem.descriptor()));
    let config = SolverConfig::from_yaml_str(yaml).unwrap();
    let result = Solver::new(graph, config).unwrap().solve(problem).unwrap();
    assert!(result.score >= constructed.score);
    assert!(!result.terminated_early);
    assert!(assigned_values(&result.solution, sports_league::MATCH, "round")
        .iter()
        .all(|v| !v.is_none()));
}

#[test]
fn test_unbounded_value_range_degrades_through_time_limit() {
    let descriptor = Arc::new(
        ProblemDescriptor::builder()
            .entity_class(EntityClassDef::new(
                "Job",
                vec![FieldDef::planning_variable("slot", ValueRangeDef::int_range(0, i64::MAX))],
            ))
            .build()
            .unwrap(),
    );
    let mut builder = Problem::<HardSoftScore>::builder(Arc::clone(&descriptor));
    for id in 0..3 {
        builder = builder.entity("Job", Entity::new(id, vec![Value::None]));
    }
    let problem = builder.build().unwrap();
    let graph = ConstraintGraph::build(descriptor, |factory: &ConstraintFactory<HardSoftScore>| {
        let slot = factory.field("Job", "slot");
        vec![factory
            .for_each("Job")
            .filter(move |t| t.row(0).get(slot).as_int().is_some_and(|v| v < 1_000))
            .penalize(HardSoftScore::ONE_HARD)
            .as_constraint("Early slot")]
    })
    .unwrap();

    let config = SolverConfig::from_toml_str("random_seed = 3\n[termination]\nmillis_spent_limit = 100\n").unwrap();
    let mut solver = Solver::new(Arc::new(graph), config).unwrap();
    let started = Instant::now();
    let result = solver.solve(problem).unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(solver.state(), SolverState::Terminated);
    assert_eq!(solver.graph().evaluate(&result.solution), result.score);
}
