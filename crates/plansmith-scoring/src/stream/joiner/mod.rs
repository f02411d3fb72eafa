// Joiners define matching conditions between a stream's tuple and the row
// being joined to it.
//
// The left side of every joiner reads the current tuple, the right side reads
// the candidate row. Equality joiners are indexed: only rows whose right keys
// equal the tuple's left keys are ever compared.
//
// ```
// use plansmith_scoring::joiner::{equal, overlapping};
// use plansmith_core::FieldId;
//
// let (employee, start, end) = (FieldId(0), FieldId(1), FieldId(2));
// let same_employee = equal(
//     move |t| t.row(0).get(employee).clone(),
//     move |r| r.get(employee).clone(),
// );
// let overlap = overlapping(
//     move |t| t.row(0).get(start).clone(),
//     move |t| t.row(0).get(end).clone(),
//     move |r| r.get(start).clone(),
//     move |r| r.get(end).clone(),
// );
// assert!(same_employee.is_indexed());
// assert!(!overlap.is_indexed());
// ```

mod comparison;
mod equal;
mod filtering;
mod overlapping;


use std::cmp::Ordering;
use std::sync::Arc;

use plansmith_core::{Row, Value};
use smallvec::SmallVec;

use crate::tuple::TupleView;

use super::{RowFn, TupleFn};

pub use comparison::{greater_than, greater_than_or_equal, less_than, less_than_or_equal};
pub use equal::equal;
pub use filtering::filtering;
pub use overlapping::overlapping;

/// Compound key of the equality joiners of one join.
pub(crate) type IndexKey = SmallVec<[Value; 2]>;

pub(crate) type JoinPredicate = Arc<dyn Fn(&TupleView<'_>, &Row<'_>) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Comparison {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::LessThan => ordering.is_lt(),
            Comparison::LessThanOrEqual => ordering.is_le(),
            Comparison::GreaterThan => ordering.is_gt(),
            Comparison::GreaterThanOrEqual => ordering.is_ge(),
        }
    }
}

/// A matching condition between a tuple and a joined row.
#[derive(Clone)]
pub enum Joiner {
    Equal {
        left: TupleFn<Value>,
        right: RowFn<Value>,
    },
    /// `left <op> right`; never matches when either side is `None`.
    Compare {
        comparison: Comparison,
        left: TupleFn<Value>,
        right: RowFn<Value>,
    },
    /// Half-open intervals `[start, end)` intersect.
    Overlapping {
        left_start: TupleFn<Value>,
        left_end: TupleFn<Value>,
        right_start: RowFn<Value>,
        right_end: RowFn<Value>,
    },
    Filtering(JoinPredicate),
}

impl Joiner {
    pub fn matches(&self, left: &TupleView<'_>, right: &Row<'_>) -> bool {
        match self {
            Joiner::Equal { left: l, right: r } => l(left) == r(right),
            Joiner::Compare {
                comparison,
                left: l,
                right: r,
            } => {
                let (a, b) = (l(left), r(right));
                a.is_some() && b.is_some() && comparison.holds(a.cmp(&b))
            }
            Joiner::Overlapping {
                left_start,
                left_end,
                right_start,
                right_end,
            } => {
                let (ls, le) = (left_start(left), left_end(left));
                let (rs, re) = (right_start(right), right_end(right));
                if ls.is_none() || le.is_none() || rs.is_none() || re.is_none() {
                    return false;
                }
                ls < re && rs < le
            }
            Joiner::Filtering(f) => f(left, right),
        }
    }

    /// True for joiners resolved through the hash index.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Joiner::Equal { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Joiner::Equal { .. } => "equal",
            Joiner::Compare {
                comparison: Comparison::LessThan,
                ..
            } => "less_than",
            Joiner::Compare {
                comparison: Comparison::LessThanOrEqual,
                ..
            } => "less_than_or_equal",
            Joiner::Compare {
                comparison: Comparison::GreaterThan,
                ..
            } => "greater_than",
            Joiner::Compare {
                comparison: Comparison::GreaterThanOrEqual,
                ..
            } => "greater_than_or_equal",
            Joiner::Overlapping { .. } => "overlapping",
            Joiner::Filtering(_) => "filtering",
        }
    }
}

impl std::fmt::Debug for Joiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind_name())
    }
}

pub(crate) fn left_key(joiners: &[Joiner], left: &TupleView<'_>) -> IndexKey {
    joiners
        .iter()
        .filter_map(|j| match j {
            Joiner::Equal { left: l, .. } => Some(l(left)),
            _ => None,
        })
        .collect()
}

pub(crate) fn right_key(joiners: &[Joiner], right: &Row<'_>) -> IndexKey {
    joiners
        .iter()
        .filter_map(|j| match j {
            Joiner::Equal { right: r, .. } => Some(r(right)),
            _ => None,
        })
        .collect()
}

/// Checks the joiners the index does not cover.
pub(crate) fn residual_match(joiners: &[Joiner], left: &TupleView<'_>, right: &Row<'_>) -> bool {
    joiners
        .iter()
        .filter(|j| !j.is_indexed())
        .all(|j| j.matches(left, right))
}

pub(crate) fn all_match(joiners: &[Joiner], left: &TupleView<'_>, right: &Row<'_>) -> bool {
    joiners.iter().all(|j| j.matches(left, right))
}
