// Runtime constraint weight configuration.
//
// Adjusts constraint weights without rewriting the constraint provider.

use std::collections::HashMap;
use std::fmt::Debug;

use plansmith_core::Score;

// Holds runtime overrides for constraint weights, keyed by constraint name.
//
// A zero weight disables the constraint.
#[derive(Clone)]
pub struct ConstraintWeightOverrides<S: Score> {
    weights: HashMap<String, S>,
}

impl<S: Score> Debug for ConstraintWeightOverrides<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintWeightOverrides")
            .field("count", &self.weights.len())
            .finish()
    }
}

impl<S: Score> Default for ConstraintWeightOverrides<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Score> ConstraintWeightOverrides<S> {
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }

    // Creates overrides from an iterator of (name, weight) pairs.
    pub fn from_pairs<I, N>(iter: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
    {
        let weights = iter.into_iter().map(|(n, w)| (n.into(), w)).collect();
        Self { weights }
    }

    pub fn put<N: Into<String>>(&mut self, name: N, weight: S) {
        self.weights.insert(name.into(), weight);
    }

    pub fn remove(&mut self, name: &str) -> Option<S> {
        self.weights.remove(name)
    }

    pub fn get_or_default(&self, name: &str, default: S) -> S {
        self.weights.get(name).copied().unwrap_or(default)
    }

    pub fn get(&self, name: &str) -> Option<&S> {
        self.weights.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.weights.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
