//! Consecutive sequence collector: splits a group into maximal runs of
//! adjacent integer indexes.

use std::collections::BTreeMap;
use std::sync::Arc;

use plansmith_core::Value;

use super::{Accumulator, Collector};
use crate::tuple::TupleView;

/// Groups items into runs whose indexes increase by exactly one.
///
/// Items sharing an index belong to the same run. A gap of two or more
/// between adjacent indexes starts a new run.
pub fn to_consecutive_sequences<I, X>(item: I, index: X) -> ConsecutiveCollector
where
    I: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    X: Fn(&TupleView<'_>) -> i64 + Send + Sync + 'static,
{
    ConsecutiveCollector {
        item: Arc::new(item),
        index: Arc::new(index),
    }
}

pub struct ConsecutiveCollector {
    item: Arc<dyn Fn(&TupleView<'_>) -> Value + Send + Sync>,
    index: Arc<dyn Fn(&TupleView<'_>) -> i64 + Send + Sync>,
}

impl Collector for ConsecutiveCollector {
    type Value = (i64, Value);
    type Result = SequenceChain;
    type Accumulator = ConsecutiveAccumulator;

    fn extract(&self, tuple: &TupleView<'_>) -> (i64, Value) {
        ((self.index)(tuple), (self.item)(tuple))
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ConsecutiveAccumulator {
            items: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsecutiveAccumulator {
    items: BTreeMap<i64, Vec<Value>>,
}

impl Accumulator<(i64, Value), SequenceChain> for ConsecutiveAccumulator {
    fn accumulate(&mut self, value: &(i64, Value)) {
        self.items.entry(value.0).or_default().push(value.1.clone());
    }

    fn retract(&mut self, value: &(i64, Value)) {
        let Some(items) = self.items.get_mut(&value.0) else {
            return;
        };
        if let Some(pos) = items.iter().position(|v| *v == value.1) {
            items.swap_remove(pos);
        }
        if items.is_empty() {
            self.items.remove(&value.0);
        }
    }

    fn finish(&self) -> SequenceChain {
        let mut sequences: Vec<Sequence> = Vec::new();
        for (&index, items) in &self.items {
            let mut sorted = items.clone();
            sorted.sort();
            match sequences.last_mut() {
                Some(seq) if seq.last_index + 1 == index => {
                    seq.last_index = index;
                    seq.items.extend(sorted);
                }
                _ => sequences.push(Sequence {
                    first_index: index,
                    last_index: index,
                    items: sorted,
                }),
            }
        }
        SequenceChain { sequences }
    }
}

/// One maximal run of consecutive indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    first_index: i64,
    last_index: i64,
    items: Vec<Value>,
}

impl Sequence {
    pub fn first_index(&self) -> i64 {
        self.first_index
    }

    pub fn last_index(&self) -> i64 {
        self.last_index
    }

    /// Number of indexes spanned, `last - first + 1`.
    pub fn length(&self) -> i64 {
        self.last_index - self.first_index + 1
    }

    /// Number of items in the run; exceeds `length` when indexes repeat.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Items in index order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn first_item(&self) -> Option<&Value> {
        self.items.first()
    }

    pub fn last_item(&self) -> Option<&Value> {
        self.items.last()
    }
}

/// Gap between two adjacent sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceBreak {
    pub previous_index: i64,
    pub next_index: i64,
}

impl SequenceBreak {
    /// Distance between the indexes on either side of the gap.
    pub fn length(&self) -> i64 {
        self.next_index - self.previous_index
    }
}

/// All runs of a group, ordered by index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceChain {
    sequences: Vec<Sequence>,
}

impl SequenceChain {
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn into_sequences(self) -> Vec<Sequence> {
        self.sequences
    }

    pub fn breaks(&self) -> Vec<SequenceBreak> {
        self.sequences
            .windows(2)
            .map(|w| SequenceBreak {
                previous_index: w[0].last_index,
                next_index: w[1].first_index,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
