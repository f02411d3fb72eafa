use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use plansmith_core::Problem;
use plansmith_test::tournament;

use super::*;
use crate::error::{ManagerError, SolverError};

fn problem() -> Arc<Problem<tournament::Score>> {
    Arc::new(tournament::generate(0, 3, 2, 2))
}

fn flag() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[test]
fn test_status_wire_names() {
    let json = serde_json::to_string(&[
        SolverStatus::NotSolving,
        SolverStatus::SolvingScheduled,
        SolverStatus::SolvingActive,
    ])
    .unwrap();
    assert_eq!(json, r#"["NOT_SOLVING","SOLVING_SCHEDULED","SOLVING_ACTIVE"]"#);
    let parsed: SolverStatus = serde_json::from_str(r#""SOLVING_ACTIVE""#).unwrap();
    assert_eq!(parsed, SolverStatus::SolvingActive);
    assert_eq!(SolverStatus::SolvingScheduled.to_string(), "SOLVING_SCHEDULED");
}

#[test]
fn test_registry_conflict_while_solving() {
    let registry = JobRegistry::new(4);
    registry.insert("a", problem(), flag()).unwrap();
    assert!(matches!(
        registry.insert("a", problem(), flag()),
        Err(ManagerError::Conflict(id)) if id == "a"
    ));

    registry.mark_active("a");
    assert!(registry.insert("a", problem(), flag()).is_err());

    registry.complete("a", problem(), false);
    // resubmitting a completed id replaces it
    registry.insert("a", problem(), flag()).unwrap();
    assert_eq!(registry.status("a"), SolverStatus::SolvingScheduled);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_registry_evicts_oldest_completed() {
    let registry = JobRegistry::new(2);
    for id in ["t1", "t2", "t3", "t4"] {
        registry.insert(id, problem(), flag()).unwrap();
    }
    for id in ["t1", "t2", "t3", "t4"] {
        registry.complete(id, problem(), false);
    }
    assert_eq!(registry.problem_ids(), ["t3", "t4"]);
    assert!(matches!(registry.best("t1"), Err(ManagerError::NotFound(_))));
    assert!(matches!(registry.best("t2"), Err(ManagerError::NotFound(_))));
    assert!(registry.best("t3").is_ok());
}

#[test]
fn test_registry_evicts_by_creation_not_completion() {
    let registry = JobRegistry::new(1);
    registry.insert("old", problem(), flag()).unwrap();
    registry.insert("new", problem(), flag()).unwrap();
    registry.complete("new", problem(), false);
    registry.complete("old", problem(), false);
    assert_eq!(registry.problem_ids(), ["new"]);
}

#[test]
fn test_registry_never_evicts_running_jobs() {
    let registry = JobRegistry::new(1);
    for id in ["a", "b", "c"] {
        registry.insert(id, problem(), flag()).unwrap();
    }
    registry.mark_active("b");
    registry.complete("c", problem(), false);
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.active_count(), 2);

    registry.fail("a", SolverError::Config("boom".to_string()));
    // "a" is the oldest completed job
    assert_eq!(registry.problem_ids(), ["b", "c"]);
}

#[test]
fn test_registry_terminate_is_idempotent() {
    let registry = JobRegistry::new(2);
    let terminate_flag = flag();
    registry.insert("a", problem(), Arc::clone(&terminate_flag)).unwrap();
    assert_eq!(registry.terminate("a").unwrap(), SolverStatus::SolvingScheduled);
    assert!(terminate_flag.load(Ordering::SeqCst));
    assert_eq!(registry.terminate("a").unwrap(), SolverStatus::SolvingScheduled);

    registry.complete("a", problem(), true);
    terminate_flag.store(false, Ordering::SeqCst);
    assert_eq!(registry.terminate("a").unwrap(), SolverStatus::NotSolving);
    assert!(!terminate_flag.load(Ordering::SeqCst));
    assert!(registry.snapshot("a").unwrap().terminated_early);

    assert!(matches!(registry.terminate("missing"), Err(ManagerError::NotFound(_))));
}

#[test]
fn test_registry_terminate_all() {
    let registry = JobRegistry::new(4);
    let flags: Vec<_> = (0..3).map(|_| flag()).collect();
    for (i, f) in flags.iter().enumerate() {
        registry.insert(&format!("job{i}"), problem(), Arc::clone(f)).unwrap();
    }
    registry.complete("job0", problem(), false);
    assert_eq!(registry.terminate_all(), 2);
    assert!(!flags[0].load(Ordering::SeqCst));
    assert!(flags[1].load(Ordering::SeqCst) && flags[2].load(Ordering::SeqCst));
}

#[test]
fn test_registry_failure_keeps_best() {
    let registry = JobRegistry::new(2);
    let initial = problem();
    registry.insert("a", Arc::clone(&initial), flag()).unwrap();
    registry.fail("a", SolverError::Config("bad".to_string()));
    assert_eq!(registry.status("a"), SolverStatus::NotSolving);
    assert!(Arc::ptr_eq(&registry.best("a").unwrap(), &initial));
    assert_eq!(registry.error("a").unwrap(), Some(SolverError::Config("bad".to_string())));
    assert_eq!(registry.status("unknown"), SolverStatus::NotSolving);
}
