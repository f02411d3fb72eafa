//! Sum collectors over integer and decimal tuple metrics.

use std::ops::{Add, Sub};
use std::sync::Arc;

use rust_decimal::Decimal;

use super::{Accumulator, Collector};
use crate::tuple::TupleView;

/// Sums an integer metric over each group.
pub fn sum<F>(metric: F) -> SumCollector<i64>
where
    F: Fn(&TupleView<'_>) -> i64 + Send + Sync + 'static,
{
    SumCollector {
        metric: Arc::new(metric),
    }
}

/// Sums a decimal metric over each group, exactly.
pub fn sum_decimal<F>(metric: F) -> SumCollector<Decimal>
where
    F: Fn(&TupleView<'_>) -> Decimal + Send + Sync + 'static,
{
    SumCollector {
        metric: Arc::new(metric),
    }
}

/// Created by [`sum()`] and [`sum_decimal()`].
pub struct SumCollector<N> {
    metric: Arc<dyn Fn(&TupleView<'_>) -> N + Send + Sync>,
}

impl<N> Collector for SumCollector<N>
where
    N: Copy + Default + Add<Output = N> + Sub<Output = N> + std::fmt::Debug + Send + Sync + 'static,
{
    type Value = N;
    type Result = N;
    type Accumulator = SumAccumulator<N>;

    #[inline]
    fn extract(&self, tuple: &TupleView<'_>) -> N {
        (self.metric)(tuple)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        SumAccumulator { total: N::default() }
    }
}

#[derive(Debug)]
pub struct SumAccumulator<N> {
    total: N,
}

impl<N> Accumulator<N, N> for SumAccumulator<N>
where
    N: Copy + Add<Output = N> + Sub<Output = N> + Send + Sync + 'static,
{
    #[inline]
    fn accumulate(&mut self, value: &N) {
        self.total = self.total + *value;
    }

    #[inline]
    fn retract(&mut self, value: &N) {
        self.total = self.total - *value;
    }

    fn finish(&self) -> N {
        self.total
    }
}
