//! Tuples flowing through constraint pipelines.

use plansmith_core::{ElementRef, Problem, Row};
use smallvec::SmallVec;

/// An ordered match of elements, one per pipeline position.
pub type Tuple = SmallVec<[ElementRef; 4]>;

/// Read-only view of a tuple handed to filters, joiners and weight functions.
///
/// Position `i` is the element contributed by the `i`-th source of the
/// stream: the root class first, then each joined class in order.
#[derive(Clone)]
pub struct TupleView<'a> {
    elements: &'a [ElementRef],
    rows: SmallVec<[Row<'a>; 4]>,
}

impl<'a> TupleView<'a> {
    pub fn new<S>(problem: &'a Problem<S>, elements: &'a [ElementRef]) -> Self
    where
        S: Copy,
    {
        let rows = elements.iter().filter_map(|&e| problem.row(e)).collect();
        Self { elements, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at position `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is past the tuple arity.
    #[inline]
    pub fn row(&self, index: usize) -> Row<'a> {
        self.rows[index]
    }

    /// The most recently joined row.
    ///
    /// # Panics
    ///
    /// Panics on an empty view.
    pub fn last(&self) -> Row<'a> {
        self.rows[self.rows.len() - 1]
    }

    pub fn rows(&self) -> &[Row<'a>] {
        &self.rows
    }

    pub fn elements(&self) -> &'a [ElementRef] {
        self.elements
    }
}

impl std::fmt::Debug for TupleView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rows.iter()).finish()
    }
}
