//! Configuration for the plansmith solver.
//!
//! Load solver configuration from TOML or YAML to control termination,
//! phases and acceptors without code changes.
//!
//! # Examples
//!
//! ```
//! use plansmith_config::SolverConfig;
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     [termination]
//!     seconds_spent_limit = 30
//!     unimproved_step_count_limit = 500
//!
//!     [[phases]]
//!     type = "construction_heuristic"
//!     construction_heuristic_type = "best_fit"
//!
//!     [[phases]]
//!     type = "local_search"
//!     [phases.acceptor]
//!     type = "late_acceptance"
//!     late_acceptance_size = 400
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(config.phases.len(), 2);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use plansmith_config::SolverConfig;
//!
//! let config = SolverConfig::load("solver.toml").unwrap_or_default();
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Environment mode affecting reproducibility and assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Random seed for reproducible results.
    #[serde(default)]
    pub random_seed: Option<u64>,

    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    #[serde(default)]
    pub score_director: Option<ScoreDirectorConfig>,

    /// Phases run in order. Empty means construction then local search.
    #[serde(default)]
    pub phases: Vec<PhaseConfig>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    pub fn with_termination(mut self, termination: TerminationConfig) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }

    /// Returns the termination time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Rejects values no solver could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for phase in &self.phases {
            let PhaseConfig::LocalSearch(local_search) = phase else {
                continue;
            };
            match &local_search.acceptor {
                Some(AcceptorConfig::LateAcceptance(la)) if la.late_acceptance_size == Some(0) => {
                    return Err(invalid("late_acceptance_size must be positive"));
                }
                Some(AcceptorConfig::TabuSearch(tabu)) if tabu.tabu_size == Some(0) => {
                    return Err(invalid("tabu_size must be positive"));
                }
                Some(AcceptorConfig::SimulatedAnnealing(sa)) => {
                    if sa.starting_temperature.is_some_and(|t| !(t > 0.0)) {
                        return Err(invalid("starting_temperature must be positive"));
                    }
                    if sa.decay_rate.is_some_and(|d| !(d > 0.0 && d <= 1.0)) {
                        return Err(invalid("decay_rate must be in (0, 1]"));
                    }
                }
                _ => {}
            }
            if local_search
                .forager
                .as_ref()
                .is_some_and(|f| f.accepted_count_limit == Some(0))
            {
                return Err(invalid("accepted_count_limit must be positive"));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

/// Environment mode affecting solver behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Seeded from the OS, minimal overhead.
    #[default]
    NonReproducible,

    /// Deterministic for a given random seed.
    Reproducible,

    /// Checks incremental against full scores once per phase.
    FastAssert,

    /// Checks incremental against full scores after every step.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_asserted(self) -> bool {
        matches!(self, Self::FastAssert | Self::FullAssert)
    }
}

/// Termination configuration. Any limit reached ends the solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    pub millis_spent_limit: Option<u64>,

    pub seconds_spent_limit: Option<u64>,

    pub minutes_spent_limit: Option<u64>,

    /// Target best score, e.g. `"0hard/0soft"`.
    pub best_score_limit: Option<String>,

    /// Stop as soon as the best solution is feasible.
    #[serde(default)]
    pub best_score_feasible: bool,

    pub step_count_limit: Option<u64>,

    pub unimproved_step_count_limit: Option<u64>,

    pub unimproved_seconds_spent_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the combined time limit, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let millis = self.millis_spent_limit.unwrap_or(0)
            + self.seconds_spent_limit.unwrap_or(0) * 1000
            + self.minutes_spent_limit.unwrap_or(0) * 60_000;
        (millis > 0).then(|| Duration::from_millis(millis))
    }

    pub fn unimproved_time_limit(&self) -> Option<Duration> {
        self.unimproved_seconds_spent_limit.map(Duration::from_secs)
    }

    /// True when no limit at all is set.
    pub fn is_unbounded(&self) -> bool {
        self.time_limit().is_none()
            && self.best_score_limit.is_none()
            && !self.best_score_feasible
            && self.step_count_limit.is_none()
            && self.unimproved_step_count_limit.is_none()
            && self.unimproved_seconds_spent_limit.is_none()
    }
}

/// Score director configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoreDirectorConfig {
    /// Recompute every score from scratch instead of incrementally.
    #[serde(default)]
    pub full_recompute: bool,

    /// Constraint name to replacement weight, e.g. `"0hard/-5soft"`.
    /// A zero weight disables the constraint.
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

/// Phase configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseConfig {
    ConstructionHeuristic(ConstructionHeuristicConfig),

    LocalSearch(LocalSearchConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConstructionHeuristicConfig {
    #[serde(default)]
    pub construction_heuristic_type: ConstructionHeuristicType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionHeuristicType {
    /// Takes the first value that does not worsen the score.
    FirstFit,

    /// Tries every value and keeps the best.
    #[default]
    BestFit,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocalSearchConfig {
    pub acceptor: Option<AcceptorConfig>,

    pub forager: Option<ForagerConfig>,

    pub move_selector: Option<MoveSelectorConfig>,

    /// Steps after which this phase ends, independent of solver termination.
    pub step_count_limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AcceptorConfig {
    /// Only accept moves that do not worsen the score.
    HillClimbing,

    TabuSearch(TabuSearchConfig),

    SimulatedAnnealing(SimulatedAnnealingConfig),

    LateAcceptance(LateAcceptanceConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TabuSearchConfig {
    /// Number of recently moved entities that are tabu.
    pub tabu_size: Option<usize>,

    /// Accept a tabu move when it beats the best score.
    pub aspiration: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulatedAnnealingConfig {
    pub starting_temperature: Option<f64>,

    /// Multiplicative decay per step.
    pub decay_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LateAcceptanceConfig {
    pub late_acceptance_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ForagerConfig {
    /// Maximum number of accepted moves evaluated per step.
    pub accepted_count_limit: Option<usize>,

    #[serde(default)]
    pub pick_early_type: PickEarlyType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickEarlyType {
    #[default]
    Never,

    /// Take the first accepted move that improves on the last step.
    FirstLastStepScoreImproving,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveSelectorConfig {
    ChangeMoveSelector(ChangeMoveConfig),

    SwapMoveSelector(SwapMoveConfig),

    UnionMoveSelector(UnionMoveSelectorConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChangeMoveConfig {
    /// Entity class filter; all classes when absent.
    pub entity_class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SwapMoveConfig {
    pub entity_class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UnionMoveSelectorConfig {
    pub selectors: Vec<MoveSelectorConfig>,
}

/// Solver manager configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SolverManagerConfig {
    /// Completed jobs kept in memory; the oldest are evicted first.
    pub retained_jobs: usize,

    /// Prefix of the solver thread names.
    pub thread_name_prefix: String,

    pub solver: SolverConfig,
}

impl Default for SolverManagerConfig {
    fn default() -> Self {
        Self {
            retained_jobs: 16,
            thread_name_prefix: "plansmith-solver".to_string(),
            solver: SolverConfig::default(),
        }
    }
}

impl SolverManagerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_retained_jobs(mut self, retained_jobs: usize) -> Self {
        self.retained_jobs = retained_jobs;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retained_jobs == 0 {
            return Err(invalid("retained_jobs must be positive"));
        }
        self.solver.validate()
    }
}

#[cfg(test)]
mod tests;
