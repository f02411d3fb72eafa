//! Wiring between configuration types and solver components.
//!
//! Selectors are built against the problem being solved, so phases are
//! built per solve rather than once per solver.

use std::time::Duration;

use plansmith_config::{
    AcceptorConfig, ConstructionHeuristicType, ForagerConfig, LocalSearchConfig, MoveSelectorConfig,
    PhaseConfig, TerminationConfig,
};
use plansmith_core::{ParseableScore, Problem, Score};

use crate::error::SolverError;
use crate::heuristic::selector::{ChangeMoveSelector, MoveSelector, SwapMoveSelector, UnionMoveSelector};
use crate::phase::construction::{BestFitForager, ConstructionHeuristicPhase, FirstFitForager};
use crate::phase::localsearch::{
    AcceptedCountForager, Acceptor, HillClimbingAcceptor, LateAcceptanceAcceptor, LocalSearchForager,
    LocalSearchPhase, SimulatedAnnealingAcceptor, TabuSearchAcceptor,
};
use crate::phase::Phase;
use crate::termination::{
    BestScoreFeasibleTermination, BestScoreTermination, OrTermination, StepCountTermination, Termination,
    TimeTermination, UnimprovedStepCountTermination, UnimprovedTimeTermination,
};

/// Time limit applied when the configuration sets no termination at all.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);

/// Accepted moves per step when the configuration names no forager.
const DEFAULT_ACCEPTED_COUNT: usize = 1;

/// Tabu search only accepts; the forager has to compare.
const DEFAULT_TABU_ACCEPTED_COUNT: usize = 1_000;

/// Builder for terminations.
pub struct TerminationBuilder;

impl TerminationBuilder {
    /// Any configured limit ends the solve; no limit at all means
    /// [`DEFAULT_TIME_LIMIT`].
    pub fn build<S: ParseableScore>(config: Option<&TerminationConfig>) -> Result<Box<dyn Termination<S>>, SolverError> {
        let Some(config) = config.filter(|c| !c.is_unbounded()) else {
            return Ok(Box::new(TimeTermination::new(DEFAULT_TIME_LIMIT)));
        };

        let mut any = OrTermination::new(Vec::new());
        if let Some(limit) = config.time_limit() {
            any.push(TimeTermination::new(limit));
        }
        if let Some(limit) = config.step_count_limit {
            any.push(StepCountTermination::new(limit));
        }
        if let Some(limit) = config.unimproved_step_count_limit {
            any.push(UnimprovedStepCountTermination::new(limit));
        }
        if let Some(limit) = config.unimproved_time_limit() {
            any.push(UnimprovedTimeTermination::new(limit));
        }
        if let Some(target) = &config.best_score_limit {
            any.push(BestScoreTermination::new(S::parse(target)?));
        }
        if config.best_score_feasible {
            any.push(BestScoreFeasibleTermination);
        }
        Ok(Box::new(any))
    }
}

/// Builder for acceptors.
pub struct AcceptorBuilder;

impl AcceptorBuilder {
    /// Late acceptance over 400 steps when not configured.
    pub fn build<S: Score>(config: Option<&AcceptorConfig>, seed: u64) -> Box<dyn Acceptor<S>> {
        match config {
            None => Box::new(LateAcceptanceAcceptor::<S>::default()),

            Some(AcceptorConfig::HillClimbing) => Box::new(HillClimbingAcceptor::new()),

            Some(AcceptorConfig::TabuSearch(tabu)) => {
                let size = tabu.tabu_size.unwrap_or(7);
                if tabu.aspiration.unwrap_or(true) {
                    Box::new(TabuSearchAcceptor::<S>::new(size))
                } else {
                    Box::new(TabuSearchAcceptor::<S>::without_aspiration(size))
                }
            }

            Some(AcceptorConfig::SimulatedAnnealing(sa)) => Box::new(SimulatedAnnealingAcceptor::new(
                sa.starting_temperature,
                sa.decay_rate.unwrap_or(0.9995),
                seed,
            )),

            Some(AcceptorConfig::LateAcceptance(la)) => {
                Box::new(LateAcceptanceAcceptor::<S>::new(la.late_acceptance_size.unwrap_or(400)))
            }
        }
    }
}

/// Builder for local search foragers.
pub struct ForagerBuilder;

impl ForagerBuilder {
    pub fn build<S: Score>(config: Option<&ForagerConfig>, acceptor: Option<&AcceptorConfig>) -> Box<dyn LocalSearchForager<S>> {
        let default_limit = match acceptor {
            Some(AcceptorConfig::TabuSearch(_)) => DEFAULT_TABU_ACCEPTED_COUNT,
            _ => DEFAULT_ACCEPTED_COUNT,
        };
        let forager = match config {
            None => AcceptedCountForager::new(default_limit),
            Some(c) => AcceptedCountForager::new(c.accepted_count_limit.unwrap_or(default_limit))
                .with_pick_early_type(c.pick_early_type),
        };
        Box::new(forager)
    }
}

/// Builder for move selectors.
pub struct MoveSelectorBuilder;

impl MoveSelectorBuilder {
    /// Union of change and swap moves over every entity class when not
    /// configured.
    pub fn build<S: Score>(
        config: Option<&MoveSelectorConfig>,
        problem: &Problem<S>,
    ) -> Result<Box<dyn MoveSelector<S>>, SolverError> {
        let descriptor = problem.descriptor();
        let class = |name: &Option<String>| -> Result<Option<usize>, SolverError> {
            Ok(match name {
                Some(name) => Some(descriptor.entity_class_index(name)?),
                None => None,
            })
        };
        Ok(match config {
            None => Box::new(UnionMoveSelector::new(vec![
                Box::new(ChangeMoveSelector::new(problem, None)),
                Box::new(SwapMoveSelector::new(problem, None)),
            ])),
            Some(MoveSelectorConfig::ChangeMoveSelector(c)) => {
                Box::new(ChangeMoveSelector::new(problem, class(&c.entity_class)?))
            }
            Some(MoveSelectorConfig::SwapMoveSelector(c)) => {
                Box::new(SwapMoveSelector::new(problem, class(&c.entity_class)?))
            }
            Some(MoveSelectorConfig::UnionMoveSelector(c)) => {
                let children = c
                    .selectors
                    .iter()
                    .map(|child| Self::build(Some(child), problem))
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(UnionMoveSelector::new(children))
            }
        })
    }
}

/// Builder for phases.
pub struct PhaseBuilder;

impl PhaseBuilder {
    /// Builds the configured phases against `problem`. No phases configured
    /// means Best Fit construction followed by local search.
    ///
    /// `seed` feeds the random parts of the phases; each phase gets its own
    /// stream derived from it.
    pub fn build<S: Score>(
        configs: &[PhaseConfig],
        problem: &Problem<S>,
        seed: u64,
    ) -> Result<Vec<Box<dyn Phase<S>>>, SolverError> {
        if configs.is_empty() {
            return Ok(vec![
                Box::new(ConstructionHeuristicPhase::new(BestFitForager::new())),
                Self::local_search(&LocalSearchConfig::default(), problem, seed.wrapping_add(1))?,
            ]);
        }
        configs
            .iter()
            .enumerate()
            .map(|(index, config)| -> Result<Box<dyn Phase<S>>, SolverError> {
                Ok(match config {
                    PhaseConfig::ConstructionHeuristic(c) => match c.construction_heuristic_type {
                        ConstructionHeuristicType::FirstFit => {
                            Box::new(ConstructionHeuristicPhase::new(FirstFitForager::new()))
                        }
                        ConstructionHeuristicType::BestFit => {
                            Box::new(ConstructionHeuristicPhase::new(BestFitForager::new()))
                        }
                    },
                    PhaseConfig::LocalSearch(c) => {
                        Self::local_search(c, problem, seed.wrapping_add(index as u64))?
                    }
                })
            })
            .collect()
    }

    fn local_search<S: Score>(
        config: &LocalSearchConfig,
        problem: &Problem<S>,
        seed: u64,
    ) -> Result<Box<dyn Phase<S>>, SolverError> {
        let selector = MoveSelectorBuilder::build(config.move_selector.as_ref(), problem)?;
        let acceptor = AcceptorBuilder::build(config.acceptor.as_ref(), seed);
        let forager = ForagerBuilder::build(config.forager.as_ref(), config.acceptor.as_ref());
        Ok(Box::new(LocalSearchPhase::new(
            selector,
            acceptor,
            forager,
            config.step_count_limit,
        )))
    }
}

#[cfg(test)]
mod tests {
    use plansmith_config::{
        ChangeMoveConfig, ConstructionHeuristicConfig, PickEarlyType, SimulatedAnnealingConfig,
        TabuSearchConfig, UnionMoveSelectorConfig,
    };
    use plansmith_core::HardSoftScore;
    use plansmith_test::{flight_crew, tournament};

    use super::*;

    #[test]
    fn test_unbounded_termination_gets_default_time_limit() {
        let termination = TerminationBuilder::build::<HardSoftScore>(None).unwrap();
        assert!(format!("{termination:?}").contains("30s"));
        let termination = TerminationBuilder::build::<HardSoftScore>(Some(&TerminationConfig::default())).unwrap();
        assert!(format!("{termination:?}").contains("30s"));
    }

    #[test]
    fn test_termination_combines_limits() {
        let config = TerminationConfig {
            seconds_spent_limit: Some(5),
            step_count_limit: Some(100),
            best_score_limit: Some("0hard/0soft".to_string()),
            ..Default::default()
        };
        let termination = TerminationBuilder::build::<HardSoftScore>(Some(&config)).unwrap();
        let debug = format!("{termination:?}");
        assert!(debug.contains("TimeTermination"));
        assert!(debug.contains("StepCountTermination"));
        assert!(debug.contains("BestScoreTermination"));
    }

    #[test]
    fn test_termination_rejects_bad_score() {
        let config = TerminationConfig {
            best_score_limit: Some("lots".to_string()),
            ..Default::default()
        };
        let err = TerminationBuilder::build::<HardSoftScore>(Some(&config)).unwrap_err();
        assert!(matches!(err, SolverError::ScoreParse(_)));
    }

    #[test]
    fn test_acceptor_builder() {
        let acceptor = AcceptorBuilder::build::<HardSoftScore>(None, 0);
        assert!(format!("{acceptor:?}").contains("LateAcceptance"));

        let config = AcceptorConfig::TabuSearch(TabuSearchConfig {
            tabu_size: Some(3),
            aspiration: Some(false),
        });
        let acceptor = AcceptorBuilder::build::<HardSoftScore>(Some(&config), 0);
        assert!(format!("{acceptor:?}").contains("aspiration_enabled: false"));

        let config = AcceptorConfig::SimulatedAnnealing(SimulatedAnnealingConfig {
            starting_temperature: Some(2.0),
            decay_rate: None,
        });
        let acceptor = AcceptorBuilder::build::<HardSoftScore>(Some(&config), 0);
        assert!(format!("{acceptor:?}").contains("SimulatedAnnealing"));
    }

    #[test]
    fn test_forager_builder_defaults() {
        let tabu = AcceptorConfig::TabuSearch(TabuSearchConfig::default());
        let forager = ForagerBuilder::build::<HardSoftScore>(None, Some(&tabu));
        assert!(format!("{forager:?}").contains("accepted_count_limit: 1000"));

        let config = ForagerConfig {
            accepted_count_limit: Some(4),
            pick_early_type: PickEarlyType::FirstLastStepScoreImproving,
        };
        let forager = ForagerBuilder::build::<HardSoftScore>(Some(&config), None);
        let debug = format!("{forager:?}");
        assert!(debug.contains("accepted_count_limit: 4"));
        assert!(debug.contains("FirstLastStepScoreImproving"));
    }

    #[test]
    fn test_move_selector_builder() {
        let problem = tournament::generate(0, 7, 18, 4);
        let selector = MoveSelectorBuilder::build(None, &problem).unwrap();
        assert_eq!(selector.size(), 67 * 7 + 67 * 66 / 2);

        let config = MoveSelectorConfig::UnionMoveSelector(UnionMoveSelectorConfig {
            selectors: vec![MoveSelectorConfig::ChangeMoveSelector(ChangeMoveConfig {
                entity_class: Some(tournament::ASSIGNMENT.to_string()),
            })],
        });
        let selector = MoveSelectorBuilder::build(Some(&config), &problem).unwrap();
        assert_eq!(selector.size(), 67 * 7);

        let config = MoveSelectorConfig::ChangeMoveSelector(ChangeMoveConfig {
            entity_class: Some("Nope".to_string()),
        });
        assert!(matches!(
            MoveSelectorBuilder::build(Some(&config), &problem),
            Err(SolverError::Model(_))
        ));
    }

    #[test]
    fn test_phase_builder() {
        let problem = flight_crew::generate(0, 3, 3);
        let phases = PhaseBuilder::build(&[], &problem, 0).unwrap();
        let names: Vec<_> = phases.iter().map(|p| p.phase_type_name()).collect();
        assert_eq!(names, ["ConstructionHeuristic", "LocalSearch"]);

        let configs = vec![PhaseConfig::ConstructionHeuristic(ConstructionHeuristicConfig {
            construction_heuristic_type: ConstructionHeuristicType::FirstFit,
        })];
        let phases = PhaseBuilder::build(&configs, &problem, 0).unwrap();
        assert_eq!(phases.len(), 1);
        assert!(format!("{:?}", phases[0]).contains("FirstFit"));
    }
}
