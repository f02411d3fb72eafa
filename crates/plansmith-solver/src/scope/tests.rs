//! Tests for scope types.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use plansmith_core::{EntityRef, HardSoftScore};
use plansmith_scoring::ScoreDirector;
use plansmith_test::flight_crew;

use super::*;
use crate::solver::SolverState;

fn create_test_director() -> ScoreDirector<HardSoftScore> {
    let problem = flight_crew::generate(1, 4, 4);
    let graph = flight_crew::constraint_graph(Arc::clone(problem.descriptor()));
    ScoreDirector::new(problem, graph).unwrap()
}

#[test]
fn test_solver_scope_creation() {
    let scope = SolverScope::with_seed(create_test_director(), 7);

    assert!(scope.best_solution().is_none());
    assert!(scope.best_score().is_none());
    assert_eq!(scope.total_step_count(), 0);
    assert_eq!(scope.state(), SolverState::Initializing);
    assert!(!scope.should_terminate());
}

#[test]
fn test_solver_scope_update_best() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut scope = SolverScope::with_seed(create_test_director(), 7).with_best_solution_callback(
        Box::new(move |solution, score| {
            assert_eq!(solution.score(), Some(score));
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    scope.start_solving();

    assert!(scope.update_best_solution());
    let best = *scope.best_score().unwrap();
    assert_eq!(scope.best_solution().unwrap().score(), Some(best));
    // same score again is not an improvement
    assert!(!scope.update_best_solution());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    scope.increment_step_count();
    scope.increment_step_count();
    assert_eq!(scope.steps_since_improvement(), 2);
    assert_eq!(scope.stats().best_score_improvements, 1);
}

#[test]
fn test_best_solution_is_a_snapshot() {
    let mut scope = SolverScope::with_seed(create_test_director(), 7);
    scope.start_solving();
    scope.update_best_solution();
    let slot = EntityRef::new(0, 0);
    let (_, employee) = scope
        .working_solution()
        .descriptor()
        .variable(flight_crew::ASSIGNMENT, "employee")
        .unwrap();
    let before = scope.best_solution().unwrap().variable(slot, employee).cloned();

    let value = if before == Some(flight_crew::employee_ref(Some(0))) {
        flight_crew::employee_ref(Some(1))
    } else {
        flight_crew::employee_ref(Some(0))
    };
    scope
        .score_director_mut()
        .change_variable(slot, employee, value)
        .unwrap();
    assert_eq!(scope.best_solution().unwrap().variable(slot, employee).cloned(), before);
}

#[test]
fn test_terminate_early_flag() {
    let flag = Arc::new(AtomicBool::new(false));
    let mut scope = SolverScope::with_seed(create_test_director(), 7);
    scope.set_terminate_early_flag(Arc::clone(&flag));
    assert!(!scope.should_terminate());
    flag.store(true, Ordering::SeqCst);
    assert!(scope.is_terminate_early());
    assert!(scope.should_terminate());
}

#[test]
fn test_take_working_solution_without_best() {
    let scope = SolverScope::with_seed(create_test_director(), 7);
    let (solution, stats) = scope.take_best_or_working_solution();
    assert!(solution.score().is_some());
    assert_eq!(stats.step_count, 0);
}

#[test]
fn test_phase_scope_counts() {
    let mut solver_scope = SolverScope::with_seed(create_test_director(), 7);
    solver_scope.start_solving();
    {
        let mut phase_scope = PhaseScope::new(&mut solver_scope, 1);
        assert_eq!(phase_scope.phase_index(), 1);
        assert!(phase_scope.starting_score().is_none());
        phase_scope.increment_step_count();
        phase_scope.record_move(true);
        phase_scope.record_move(false);
        assert_eq!(phase_scope.step_count(), 1);
        assert_eq!(phase_scope.moves_evaluated(), 2);
        assert_eq!(phase_scope.best_score_label(), "none");
    }
    assert_eq!(solver_scope.total_step_count(), 1);
    assert_eq!(solver_scope.stats().moves_accepted, 1);
}
