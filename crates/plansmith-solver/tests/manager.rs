//! Jobs run through the manager on real solver threads.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use plansmith_config::{SolverManagerConfig, SolverConfig, TerminationConfig};
use plansmith_core::{HardSoftScore, Problem, Score};
use plansmith_scoring::ScoreDirectorError;
use plansmith_solver::{ManagerError, SolverError, SolverEvent, SolverManager, SolverStatus};
use plansmith_test::flight_crew::{self, ATTENDANT, PILOT};
use plansmith_test::sports_league;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

const WAIT: Duration = Duration::from_secs(60);

fn config(termination: TerminationConfig) -> SolverManagerConfig {
    SolverManagerConfig::default().with_solver(
        SolverConfig::new()
            .with_random_seed(7)
            .with_termination(termination),
    )
}

fn steps(limit: u64) -> SolverManagerConfig {
    config(TerminationConfig {
        step_count_limit: Some(limit),
        ..Default::default()
    })
}

fn long_running() -> SolverManagerConfig {
    config(TerminationConfig {
        minutes_spent_limit: Some(10),
        ..Default::default()
    })
}

fn manager(config: SolverManagerConfig) -> SolverManager<HardSoftScore> {
    let descriptor = flight_crew::descriptor();
    SolverManager::new(flight_crew::constraint_graph(descriptor), config).unwrap()
}

fn crew(seed: u64) -> Problem<HardSoftScore> {
    flight_crew::generate(seed, 30, 10)
}

/// Next event, failing the test once `WAIT` has passed.
fn next_event(events: &mut UnboundedReceiver<SolverEvent<HardSoftScore>>) -> SolverEvent<HardSoftScore> {
    let deadline = Instant::now() + WAIT;
    loop {
        match events.try_recv() {
            Ok(event) => return event,
            Err(TryRecvError::Empty) if Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(2));
            }
            Err(e) => panic!("no event: {e:?}"),
        }
    }
}

fn wait_for_end(
    events: &mut UnboundedReceiver<SolverEvent<HardSoftScore>>,
    problem_id: &str,
) -> SolverEvent<HardSoftScore> {
    loop {
        let event = next_event(events);
        if event.is_final() && event.problem_id() == problem_id {
            return event;
        }
    }
}

#[test]
fn test_single_unqualified_employee_costs_one_skill_penalty() {
    let problem = flight_crew::builder()
        .fact(flight_crew::AIRPORT, flight_crew::airport(0, "LHR"))
        .fact(flight_crew::EMPLOYEE, flight_crew::employee(1, "Amy", 0, &[ATTENDANT], &[]))
        .fact(flight_crew::FLIGHT, flight_crew::flight(1, 0, 600, 0, 1000))
        .entity(flight_crew::ASSIGNMENT, flight_crew::assignment(1, 1, 0, PILOT, Some(1)))
        .build()
        .unwrap();
    let manager = manager(steps(20));

    let explanation = manager.analyze(&problem).unwrap();
    assert_eq!(explanation.score, HardSoftScore::of_hard(-100));
    let skill = explanation.constraint("Required skill").unwrap();
    assert_eq!(skill.weight, HardSoftScore::of_hard(100));
    assert_eq!(skill.match_count(), 1);
    assert_eq!(explanation.non_zero_constraints().len(), 1);
    assert_eq!(manager.get_status("crew"), SolverStatus::NotSolving);

    let mut events = manager.subscribe();
    manager.submit("crew", problem).unwrap();
    let SolverEvent::SolvingEnded { score, .. } = wait_for_end(&mut events, "crew") else {
        panic!("solve failed");
    };
    assert_eq!(score, HardSoftScore::of_hard(-100));
    let best = manager.get_best("crew").unwrap();
    assert_eq!(best.score(), Some(HardSoftScore::of_hard(-100)));
    assert!(!best.score().unwrap().is_feasible());
    assert_eq!(manager.get_status("crew"), SolverStatus::NotSolving);
}

#[test]
fn test_retention_keeps_the_newest_completed_jobs() {
    let manager = manager(steps(30).with_retained_jobs(2));
    let mut events = manager.subscribe();
    for (seed, id) in ["t1", "t2", "t3", "t4"].into_iter().enumerate() {
        manager.submit(id, flight_crew::generate(seed as u64, 6, 5)).unwrap();
        assert!(matches!(wait_for_end(&mut events, id), SolverEvent::SolvingEnded { .. }));
    }

    for id in ["t1", "t2"] {
        assert!(matches!(manager.get_best(id), Err(ManagerError::NotFound(_))));
        assert_eq!(manager.get_status(id), SolverStatus::NotSolving);
    }
    for id in ["t3", "t4"] {
        assert!(manager.get_best(id).unwrap().score().is_some());
    }
}

#[test]
fn test_duplicate_submit_conflicts_and_terminate_is_idempotent() {
    let manager = manager(long_running());
    let mut events = manager.subscribe();
    manager.submit("job", crew(1)).unwrap();
    assert!(manager.get_status("job").is_solving());

    assert!(matches!(manager.submit("job", crew(2)), Err(ManagerError::Conflict(id)) if id == "job"));
    assert_eq!(manager.active_count(), 1);

    manager.terminate("job").unwrap();
    manager.terminate("job").unwrap();
    let SolverEvent::SolvingEnded { terminated_early, .. } = wait_for_end(&mut events, "job") else {
        panic!("solve failed");
    };
    assert!(terminated_early);
    assert_eq!(manager.terminate("job").unwrap(), SolverStatus::NotSolving);
    assert!(matches!(manager.terminate("other"), Err(ManagerError::NotFound(_))));

    // a completed id can be solved again
    manager.submit("job", crew(2)).unwrap();
    manager.terminate("job").unwrap();
    wait_for_end(&mut events, "job");
}

#[test]
fn test_cancellation_is_prompt_and_keeps_a_real_score() {
    let manager = manager(long_running());
    let mut events = manager.subscribe();
    manager.submit("big", flight_crew::generate(3, 60, 15)).unwrap();

    let mut seen = Vec::new();
    while seen.len() < 2 {
        if let SolverEvent::BestSolutionChanged { score, .. } = next_event(&mut events) {
            seen.push(score);
        }
    }
    thread::sleep(Duration::from_millis(50));
    assert_eq!(manager.get_status("big"), SolverStatus::SolvingActive);

    let requested = Instant::now();
    manager.terminate("big").unwrap();
    let ended = loop {
        match next_event(&mut events) {
            SolverEvent::BestSolutionChanged { score, .. } => seen.push(score),
            event if event.is_final() => break event,
            _ => {}
        }
    };
    assert!(requested.elapsed() < Duration::from_secs(2));

    let SolverEvent::SolvingEnded {
        solution,
        score,
        terminated_early,
        ..
    } = ended
    else {
        panic!("solve failed");
    };
    assert!(terminated_early);
    assert_eq!(manager.get_status("big"), SolverStatus::NotSolving);
    assert_eq!(manager.graph().evaluate(&solution), score);
    assert_eq!(seen.last(), Some(&score));
    assert!(Arc::ptr_eq(&manager.get_best("big").unwrap(), &solution));
}

#[test]
fn test_cancel_before_the_thread_starts() {
    let manager = manager(long_running());
    let mut events = manager.subscribe();
    manager.submit("early", crew(4)).unwrap();
    manager.terminate("early").unwrap();
    let SolverEvent::SolvingEnded { solution, score, .. } = wait_for_end(&mut events, "early") else {
        panic!("solve failed");
    };
    assert_eq!(solution.score(), Some(score));
}

#[test]
fn test_listener_sees_one_job_in_order() {
    let manager = manager(steps(400));
    let seen: Arc<Mutex<Vec<SolverEvent<HardSoftScore>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut events = manager.subscribe();
    manager
        .submit_with_listener("listened", crew(5), move |event: &SolverEvent<HardSoftScore>| {
            sink.lock().push(event.clone());
        })
        .unwrap();
    manager.submit("other", crew(6)).unwrap();
    wait_for_end(&mut events, "listened");
    wait_for_end(&mut events, "other");

    let seen = seen.lock();
    assert!(seen.iter().all(|e| e.problem_id() == "listened"));
    assert!(matches!(seen.first(), Some(SolverEvent::SolvingStarted { .. })));
    assert!(seen.last().is_some_and(|e| e.is_final()));

    let bests: Vec<HardSoftScore> = seen
        .iter()
        .filter_map(|e| match e {
            SolverEvent::BestSolutionChanged { solution, score, .. } => {
                assert_eq!(solution.score(), Some(*score));
                Some(*score)
            }
            _ => None,
        })
        .collect();
    assert!(!bests.is_empty());
    assert!(bests.windows(2).all(|w| w[0] < w[1]));
    let Some(SolverEvent::SolvingEnded { score, .. }) = seen.last() else {
        panic!("solve failed");
    };
    assert_eq!(bests.last(), Some(score));
}

#[test]
fn test_jobs_run_concurrently() {
    let manager = manager(long_running());
    let mut events = manager.subscribe();
    for id in ["a", "b", "c"] {
        manager.submit(id, crew(7)).unwrap();
    }
    assert_eq!(manager.active_count(), 3);
    assert_eq!(manager.terminate_all(), 3);
    for id in ["a", "b", "c"] {
        wait_for_end(&mut events, id);
    }
    assert_eq!(manager.active_count(), 0);
}

#[test]
fn test_foreign_problem_is_rejected() {
    let manager = manager(steps(5));
    let other = sports_league::generate(0, 4);
    let expected = SolverError::ScoreDirector(ScoreDirectorError::DescriptorMismatch);
    assert!(matches!(manager.analyze(&other), Err(ManagerError::Build(e)) if e == expected));
    assert!(matches!(manager.submit("x", other), Err(ManagerError::Build(_))));
    assert!(matches!(manager.get_best("x"), Err(ManagerError::NotFound(_))));
}

#[test]
fn test_invalid_manager_config() {
    let descriptor = flight_crew::descriptor();
    let result = SolverManager::new(
        flight_crew::constraint_graph(descriptor),
        steps(5).with_retained_jobs(0),
    );
    assert!(matches!(result, Err(ManagerError::Build(SolverError::Config(_)))));
}
