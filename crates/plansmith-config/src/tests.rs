//! Tests for solver configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        environment_mode = "reproducible"
        random_seed = 42

        [termination]
        seconds_spent_limit = 30
        best_score_limit = "0hard/0soft"

        [score_director]
        full_recompute = true
        [score_director.constraint_weights]
        "Idle employee" = "0hard/0soft"

        [[phases]]
        type = "construction_heuristic"
        construction_heuristic_type = "first_fit"

        [[phases]]
        type = "local_search"
        [phases.acceptor]
        type = "late_acceptance"
        late_acceptance_size = 400
        [phases.move_selector]
        type = "union_move_selector"
        [[phases.move_selector.selectors]]
        type = "change_move_selector"
        [[phases.move_selector.selectors]]
        type = "swap_move_selector"
        entity_class = "Shift"
    "#;

    let config = SolverConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::Reproducible);
    assert_eq!(config.random_seed, Some(42));
    let termination = config.termination.as_ref().unwrap();
    assert_eq!(termination.seconds_spent_limit, Some(30));
    assert_eq!(termination.best_score_limit.as_deref(), Some("0hard/0soft"));

    let director = config.score_director.as_ref().unwrap();
    assert!(director.full_recompute);
    assert_eq!(director.constraint_weights["Idle employee"], "0hard/0soft");

    assert_eq!(config.phases.len(), 2);
    assert_eq!(
        config.phases[0],
        PhaseConfig::ConstructionHeuristic(ConstructionHeuristicConfig {
            construction_heuristic_type: ConstructionHeuristicType::FirstFit,
        })
    );
    let PhaseConfig::LocalSearch(local_search) = &config.phases[1] else {
        panic!("expected local search");
    };
    assert_eq!(
        local_search.acceptor,
        Some(AcceptorConfig::LateAcceptance(LateAcceptanceConfig {
            late_acceptance_size: Some(400),
        }))
    );
    let Some(MoveSelectorConfig::UnionMoveSelector(union)) = &local_search.move_selector else {
        panic!("expected union selector");
    };
    assert_eq!(union.selectors.len(), 2);
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        environment_mode: full_assert
        random_seed: 42
        termination:
          millis_spent_limit: 500
          unimproved_step_count_limit: 100
        phases:
          - type: construction_heuristic
          - type: local_search
            acceptor:
              type: simulated_annealing
              starting_temperature: 2.0
              decay_rate: 0.99
            forager:
              accepted_count_limit: 4
              pick_early_type: first_last_step_score_improving
    "#;

    let config = SolverConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
    assert!(config.environment_mode.is_asserted());
    assert_eq!(config.time_limit(), Some(Duration::from_millis(500)));
    assert_eq!(
        config.phases[0],
        PhaseConfig::ConstructionHeuristic(ConstructionHeuristicConfig::default())
    );
    let PhaseConfig::LocalSearch(local_search) = &config.phases[1] else {
        panic!("expected local search");
    };
    assert_eq!(
        local_search.forager,
        Some(ForagerConfig {
            accepted_count_limit: Some(4),
            pick_early_type: PickEarlyType::FirstLastStepScoreImproving,
        })
    );
}

#[test]
fn test_builder() {
    let config = SolverConfig::new()
        .with_random_seed(123)
        .with_termination_seconds(60)
        .with_phase(PhaseConfig::ConstructionHeuristic(
            ConstructionHeuristicConfig::default(),
        ))
        .with_phase(PhaseConfig::LocalSearch(LocalSearchConfig::default()));

    assert_eq!(config.random_seed, Some(123));
    assert_eq!(config.phases.len(), 2);
    assert_eq!(config.time_limit(), Some(Duration::from_secs(60)));
}

#[test]
fn test_time_limits_add_up() {
    let termination = TerminationConfig {
        millis_spent_limit: Some(250),
        seconds_spent_limit: Some(2),
        minutes_spent_limit: Some(1),
        ..TerminationConfig::default()
    };
    assert_eq!(termination.time_limit(), Some(Duration::from_millis(62_250)));
    assert!(!termination.is_unbounded());
    assert!(TerminationConfig::default().is_unbounded());
}

#[test]
fn test_invalid_values_are_rejected() {
    let toml = r#"
        [[phases]]
        type = "local_search"
        [phases.acceptor]
        type = "late_acceptance"
        late_acceptance_size = 0
    "#;
    assert!(matches!(
        SolverConfig::from_toml_str(toml),
        Err(ConfigError::Invalid(_))
    ));

    let yaml = r#"
        phases:
          - type: local_search
            acceptor:
              type: simulated_annealing
              decay_rate: 1.5
    "#;
    assert!(matches!(
        SolverConfig::from_yaml_str(yaml),
        Err(ConfigError::Invalid(_))
    ));

    assert!(matches!(
        SolverConfig::from_toml_str("environment_mode = \"sometimes\""),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn test_manager_config() {
    let config = SolverManagerConfig::from_toml_str(
        r#"
        retained_jobs = 2

        [solver]
        random_seed = 7
        [solver.termination]
        step_count_limit = 1000
    "#,
    )
    .unwrap();
    assert_eq!(config.retained_jobs, 2);
    assert_eq!(config.thread_name_prefix, "plansmith-solver");
    assert_eq!(config.solver.random_seed, Some(7));

    let defaults = SolverManagerConfig::default();
    assert_eq!(defaults.retained_jobs, 16);
    assert!(matches!(
        defaults.with_retained_jobs(0).validate(),
        Err(ConfigError::Invalid(_))
    ));
}
