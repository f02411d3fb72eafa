//! Simulated annealing acceptor.

use plansmith_core::{EntityRef, Score};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Acceptor;

/// Simulated annealing acceptor - accepts worsening moves with a probability
/// that shrinks as the temperature cools.
///
/// A worsening move is accepted with probability `exp(delta / T)`, where
/// `delta` is the (negative) difference on the highest score level that
/// differs. The temperature decays multiplicatively after every step.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealingAcceptor {
    starting_temperature: Option<f64>,
    current_temperature: f64,
    decay_rate: f64,
    rng: StdRng,
}

impl SimulatedAnnealingAcceptor {
    /// Creates a new simulated annealing acceptor.
    ///
    /// Without a starting temperature, one is derived from the initial score
    /// when the phase starts.
    pub fn new(starting_temperature: Option<f64>, decay_rate: f64, seed: u64) -> Self {
        Self {
            starting_temperature,
            current_temperature: starting_temperature.unwrap_or(1.0),
            decay_rate,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.current_temperature
    }

    /// Five percent of the magnitude of the lowest level, at least one.
    fn derived_temperature<S: Score>(initial_score: &S) -> f64 {
        let levels = initial_score.to_level_numbers();
        levels
            .last()
            .map_or(1.0, |soft| (soft.abs() * 0.05).max(1.0))
    }
}

impl Default for SimulatedAnnealingAcceptor {
    fn default() -> Self {
        Self::new(None, 0.9995, 0)
    }
}

impl<S: Score> Acceptor<S> for SimulatedAnnealingAcceptor {
    fn is_accepted(&mut self, last_step_score: &S, move_score: &S, _moved: &[EntityRef]) -> bool {
        if move_score >= last_step_score {
            return true;
        }
        if self.current_temperature <= 0.0 {
            return false;
        }
        let delta = move_score
            .to_level_numbers()
            .into_iter()
            .zip(last_step_score.to_level_numbers())
            .map(|(m, l)| m - l)
            .find(|d| *d != 0.0)
            .unwrap_or(0.0);
        let probability = (delta / self.current_temperature).exp();
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    fn phase_started(&mut self, initial_score: &S) {
        self.current_temperature = self
            .starting_temperature
            .unwrap_or_else(|| Self::derived_temperature(initial_score));
    }

    fn step_ended(&mut self, _step_score: &S, _moved: &[EntityRef]) {
        self.current_temperature *= self.decay_rate;
    }
}
