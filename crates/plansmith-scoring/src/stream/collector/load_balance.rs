//! LoadBalance collector for computing unfairness of a distribution.
//!
//! Unfairness is the square root of the sum of squared deviations of each
//! balanced item's load from the mean load. Zero means perfectly balanced.

use std::collections::HashMap;
use std::sync::Arc;

use plansmith_core::Value;
use rust_decimal::{Decimal, MathematicalOps};

use super::{Accumulator, Collector};
use crate::tuple::TupleView;

/// Decimal places kept in [`LoadBalance::unfairness`].
pub const UNFAIRNESS_SCALE: u32 = 5;

/// Result of load balancing: loads per balanced item and their unfairness.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalance {
    loads: HashMap<Value, i64>,
    unfairness: Decimal,
}

impl LoadBalance {
    /// Returns map of balanced items to their total load.
    pub fn loads(&self) -> &HashMap<Value, i64> {
        &self.loads
    }

    /// `sqrt(Σ (load - mean)²)`, rounded to [`UNFAIRNESS_SCALE`] places.
    pub fn unfairness(&self) -> Decimal {
        self.unfairness
    }
}

/// Creates a load balance collector.
///
/// `balanced` names the item receiving load (an employee, a team), `metric`
/// how much load the tuple adds. Tuples with a zero metric are ignored.
pub fn load_balance<B, M>(balanced: B, metric: M) -> LoadBalanceCollector
where
    B: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    M: Fn(&TupleView<'_>) -> i64 + Send + Sync + 'static,
{
    LoadBalanceCollector {
        balanced: Arc::new(balanced),
        metric: Arc::new(metric),
    }
}

pub struct LoadBalanceCollector {
    balanced: Arc<dyn Fn(&TupleView<'_>) -> Value + Send + Sync>,
    metric: Arc<dyn Fn(&TupleView<'_>) -> i64 + Send + Sync>,
}

impl Collector for LoadBalanceCollector {
    type Value = (Value, i64);
    type Result = LoadBalance;
    type Accumulator = LoadBalanceAccumulator;

    #[inline]
    fn extract(&self, tuple: &TupleView<'_>) -> Self::Value {
        ((self.balanced)(tuple), (self.metric)(tuple))
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        LoadBalanceAccumulator::default()
    }
}

/// Accumulator maintaining the load sum and sum of squares in exact integers.
#[derive(Debug, Default)]
pub struct LoadBalanceAccumulator {
    /// Count of items per balanced key (for duplicate tracking)
    item_counts: HashMap<Value, usize>,
    loads: HashMap<Value, i64>,
    sum: i64,
    sum_of_squares: i128,
}

impl LoadBalanceAccumulator {
    fn add_to_metric(&mut self, key: &Value, diff: i64) {
        let old_value = self.loads.get(key).copied().unwrap_or(0);
        let new_value = old_value + diff;
        self.loads.insert(key.clone(), new_value);
        self.sum += diff;
        self.sum_of_squares += i128::from(new_value).pow(2) - i128::from(old_value).pow(2);
    }

    fn reset_metric(&mut self, key: &Value) {
        if let Some(old_value) = self.loads.remove(key) {
            self.sum -= old_value;
            self.sum_of_squares -= i128::from(old_value).pow(2);
        }
    }

    fn compute_unfairness(&self) -> Decimal {
        let n = self.item_counts.len() as i128;
        if n == 0 {
            return Decimal::ZERO;
        }
        // n * Σx² - (Σx)² = n * Σ(x - mean)²
        let numerator = n * self.sum_of_squares - i128::from(self.sum).pow(2);
        let Ok(numerator) = Decimal::try_from_i128_with_scale(numerator.max(0), 0) else {
            return Decimal::MAX;
        };
        numerator
            .checked_div(Decimal::from(n as i64))
            .and_then(|d| d.sqrt())
            .map_or(Decimal::MAX, |d| d.round_dp(UNFAIRNESS_SCALE))
    }
}

impl Accumulator<(Value, i64), LoadBalance> for LoadBalanceAccumulator {
    fn accumulate(&mut self, value: &(Value, i64)) {
        let (key, metric) = value;
        if *metric == 0 {
            return;
        }
        *self.item_counts.entry(key.clone()).or_insert(0) += 1;
        self.add_to_metric(key, *metric);
    }

    fn retract(&mut self, value: &(Value, i64)) {
        let (key, metric) = value;
        if *metric == 0 {
            return;
        }
        let Some(count) = self.item_counts.get_mut(key) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.item_counts.remove(key);
            self.reset_metric(key);
        } else {
            self.add_to_metric(key, -*metric);
        }
    }

    fn finish(&self) -> LoadBalance {
        LoadBalance {
            loads: self.loads.clone(),
            unfairness: self.compute_unfairness(),
        }
    }
}
