//! Integration tests for termination conditions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use plansmith_core::HardSoftScore;

use super::*;
use crate::test_utils::crew_scope;

#[test]
fn test_step_count_termination() {
    let mut scope = crew_scope(0);
    let term = StepCountTermination::new(3);
    for _ in 0..2 {
        scope.increment_step_count();
        assert!(!term.is_terminated(&scope));
    }
    scope.increment_step_count();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_time_termination() {
    let scope = crew_scope(0);
    assert!(!Termination::<HardSoftScore>::is_terminated(&TimeTermination::seconds(60), &scope));
    sleep(Duration::from_millis(20));
    assert!(TimeTermination::millis(10).is_terminated(&scope));
}

#[test]
fn test_time_termination_before_start() {
    let scope = SolverScope::with_seed(crate::test_utils::crew_director(0), 0);
    assert!(!TimeTermination::millis(0).is_terminated(&scope));
}

#[test]
fn test_unimproved_step_count_termination() {
    let mut scope = crew_scope(1);
    let term = UnimprovedStepCountTermination::new(2);
    scope.update_best_solution();
    scope.increment_step_count();
    assert!(!term.is_terminated(&scope));
    scope.increment_step_count();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_unimproved_time_termination() {
    let mut scope = crew_scope(0);
    scope.update_best_solution();
    assert!(!Termination::<HardSoftScore>::is_terminated(
        &UnimprovedTimeTermination::seconds(60),
        &scope
    ));
    sleep(Duration::from_millis(20));
    assert!(UnimprovedTimeTermination::new(Duration::from_millis(10)).is_terminated(&scope));
}

#[test]
fn test_best_score_termination() {
    let mut scope = crew_scope(2);
    assert!(!BestScoreTermination::new(HardSoftScore::of(-1000, -1000)).is_terminated(&scope));
    scope.update_best_solution();
    let best = *scope.best_score().unwrap();
    assert!(BestScoreTermination::new(best).is_terminated(&scope));
    assert!(!BestScoreTermination::new(best + HardSoftScore::ONE_SOFT).is_terminated(&scope));
    assert_eq!(
        Termination::<HardSoftScore>::is_terminated(&BestScoreFeasibleTermination, &scope),
        best.is_feasible()
    );
}

#[test]
fn test_external_termination() {
    let scope = crew_scope(0);
    let flag = Arc::new(AtomicBool::new(false));
    let term = ExternalTermination::new(Arc::clone(&flag));
    assert!(!Termination::<HardSoftScore>::is_terminated(&term, &scope));
    flag.store(true, Ordering::SeqCst);
    assert!(Termination::<HardSoftScore>::is_terminated(&term, &scope));
}

#[test]
fn test_or_termination() {
    let mut scope = crew_scope(0);
    let mut any = OrTermination::<HardSoftScore>::default();
    assert!(!any.is_terminated(&scope));
    any.push(TimeTermination::seconds(60));
    any.push(StepCountTermination::new(1));
    assert_eq!(any.len(), 2);
    assert!(!any.is_terminated(&scope));
    scope.increment_step_count();
    assert!(any.is_terminated(&scope));
}

#[test]
fn test_scope_termination_is_checked() {
    let mut scope = crew_scope(0).with_termination(Box::new(StepCountTermination::new(1)));
    assert!(!scope.should_terminate());
    scope.increment_step_count();
    assert!(scope.should_terminate());
}
