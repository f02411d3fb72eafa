//! Count collector for counting tuples.

use super::{Accumulator, Collector};
use crate::tuple::TupleView;

/// Creates a collector that counts the tuples of each group.
pub fn count() -> CountCollector {
    CountCollector
}

/// A collector that counts tuples.
///
/// Created by the [`count()`] function.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountCollector;

impl Collector for CountCollector {
    type Value = ();
    type Result = usize;
    type Accumulator = CountAccumulator;

    #[inline]
    fn extract(&self, _tuple: &TupleView<'_>) {}

    fn create_accumulator(&self) -> Self::Accumulator {
        CountAccumulator { count: 0 }
    }
}

/// Accumulator for counting tuples.
#[derive(Debug)]
pub struct CountAccumulator {
    count: usize,
}

impl CountAccumulator {
    /// Returns the current count.
    #[inline]
    pub fn get(&self) -> usize {
        self.count
    }
}

impl Accumulator<(), usize> for CountAccumulator {
    #[inline]
    fn accumulate(&mut self, _: &()) {
        self.count += 1;
    }

    #[inline]
    fn retract(&mut self, _: &()) {
        self.count = self.count.saturating_sub(1);
    }

    fn finish(&self) -> usize {
        self.count
    }
}
