// Collectors for grouping and aggregating tuples.

mod consecutive;
mod count;
mod load_balance;
mod sum;

#[cfg(test)]
mod tests;

use std::fmt::Debug;

use crate::tuple::TupleView;

pub use consecutive::{
    to_consecutive_sequences, ConsecutiveAccumulator, ConsecutiveCollector, Sequence,
    SequenceBreak, SequenceChain,
};
pub use count::{count, CountAccumulator, CountCollector};
pub use load_balance::{load_balance, LoadBalance, LoadBalanceAccumulator, LoadBalanceCollector};
pub use sum::{sum, sum_decimal, SumAccumulator, SumCollector};

/// Extracts a value from each tuple of a group and folds it incrementally.
pub trait Collector: Send + Sync + 'static {
    /// What one tuple contributes to the group.
    type Value: Clone + Send + Sync + 'static;
    /// The aggregate seen by downstream filters and weights.
    type Result: Debug + Send + Sync + 'static;
    type Accumulator: Accumulator<Self::Value, Self::Result>;

    fn extract(&self, tuple: &TupleView<'_>) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;
}

/// Incremental fold. `retract` undoes exactly one earlier `accumulate`.
pub trait Accumulator<V, R>: Send + Sync + 'static {
    fn accumulate(&mut self, value: &V);

    fn retract(&mut self, value: &V);

    fn finish(&self) -> R;
}
