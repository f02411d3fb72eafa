//! Compiled form of a constraint stream.
//!
//! A pipeline is a chain of levels. Level 0 holds the root source, level `k`
//! the `k`-th join; each level carries the filters declared at its arity.
//! Existence stages are evaluated against complete tuples.

use std::fmt::Write;

use plansmith_core::{ElementRef, EntityRef, Problem, ProblemDescriptor, Score};
use smallvec::smallvec;

use crate::stream::joiner::{all_match, Joiner};
use crate::stream::TuplePredicate;
use crate::tuple::{Tuple, TupleView};

/// Where the elements of one pipeline position come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Facts(usize),
    /// Entities of a class; unassigned ones only when `include_unassigned`.
    Entities {
        class: usize,
        include_unassigned: bool,
    },
}

impl Source {
    /// True when `element` belongs to this source's class, admitted or not.
    pub(crate) fn covers(self, element: ElementRef) -> bool {
        match (self, element) {
            (Source::Facts(class), ElementRef::Fact { class: c, .. }) => class == c,
            (Source::Entities { class, .. }, ElementRef::Entity(e)) => class == e.class,
            _ => false,
        }
    }

    pub(crate) fn admits<S: Score>(self, problem: &Problem<S>, element: ElementRef) -> bool {
        match (self, element) {
            (Source::Entities {
                include_unassigned, ..
            }, ElementRef::Entity(e)) => {
                self.covers(element) && (include_unassigned || problem.is_assigned(e))
            }
            _ => self.covers(element),
        }
    }

    /// Every element of the class, admitted or not.
    pub(crate) fn all_elements<'p, S: Score>(
        self,
        problem: &'p Problem<S>,
    ) -> Box<dyn Iterator<Item = ElementRef> + 'p> {
        match self {
            Source::Facts(class) => Box::new(
                (0..problem.facts().facts(class).len())
                    .map(move |index| ElementRef::Fact { class, index }),
            ),
            Source::Entities { class, .. } => Box::new(
                (0..problem.entities(class).len())
                    .map(move |index| ElementRef::Entity(EntityRef::new(class, index))),
            ),
        }
    }

    pub(crate) fn elements<'p, S: Score>(
        self,
        problem: &'p Problem<S>,
    ) -> impl Iterator<Item = ElementRef> + 'p {
        self.all_elements(problem)
            .filter(move |&e| self.admits(problem, e))
    }

    pub fn class_name(self, descriptor: &ProblemDescriptor) -> &str {
        match self {
            Source::Facts(class) => descriptor.fact_class_name(class),
            Source::Entities { class, .. } => descriptor.entity_class_name(class),
        }
    }
}

/// Stream operations in declaration order, before compilation.
#[derive(Clone)]
pub(crate) enum Stage {
    Filter(TuplePredicate),
    Join {
        source: Source,
        joiners: Vec<Joiner>,
    },
    Exists {
        source: Source,
        joiners: Vec<Joiner>,
        negated: bool,
    },
}

pub(crate) struct Level {
    pub(crate) source: Source,
    /// Empty for the root level.
    pub(crate) joiners: Vec<Joiner>,
    pub(crate) filters: Vec<TuplePredicate>,
}

impl Level {
    pub(crate) fn accepts(&self, view: &TupleView<'_>) -> bool {
        self.filters.iter().all(|f| f(view))
    }
}

pub(crate) struct ExistsStage {
    pub(crate) source: Source,
    pub(crate) joiners: Vec<Joiner>,
    pub(crate) negated: bool,
}

pub struct Pipeline {
    pub(crate) levels: Vec<Level>,
    pub(crate) exists: Vec<ExistsStage>,
}

impl Pipeline {
    pub(crate) fn compile(root: Source, stages: Vec<Stage>) -> Self {
        let mut levels = vec![Level {
            source: root,
            joiners: Vec::new(),
            filters: Vec::new(),
        }];
        let mut exists = Vec::new();
        for stage in stages {
            match stage {
                Stage::Filter(f) => {
                    if let Some(level) = levels.last_mut() {
                        level.filters.push(f);
                    }
                }
                Stage::Join { source, joiners } => levels.push(Level {
                    source,
                    joiners,
                    filters: Vec::new(),
                }),
                Stage::Exists {
                    source,
                    joiners,
                    negated,
                } => exists.push(ExistsStage {
                    source,
                    joiners,
                    negated,
                }),
            }
        }
        Self { levels, exists }
    }

    pub fn arity(&self) -> usize {
        self.levels.len()
    }

    /// Every source the pipeline reads, joins and existence stages included.
    pub(crate) fn sources(&self) -> impl Iterator<Item = Source> + '_ {
        self.levels
            .iter()
            .map(|l| l.source)
            .chain(self.exists.iter().map(|e| e.source))
    }

    pub(crate) fn is_alive(&self, counts: &[usize]) -> bool {
        self.exists
            .iter()
            .zip(counts)
            .all(|(stage, &count)| (count > 0) != stage.negated)
    }

    /// Enumerates every complete tuple from scratch, ignoring any memory.
    pub(crate) fn enumerate<S: Score>(&self, problem: &Problem<S>) -> Vec<Tuple> {
        let root = &self.levels[0];
        let mut tuples: Vec<Tuple> = root
            .source
            .elements(problem)
            .map(|e| -> Tuple { smallvec![e] })
            .filter(|t| root.accepts(&TupleView::new(problem, t)))
            .collect();

        for level in &self.levels[1..] {
            let rights: Vec<ElementRef> = level.source.elements(problem).collect();
            let mut next = Vec::new();
            for tuple in &tuples {
                let view = TupleView::new(problem, tuple);
                for &right in &rights {
                    let Some(row) = problem.row(right) else {
                        continue;
                    };
                    if !all_match(&level.joiners, &view, &row) {
                        continue;
                    }
                    let mut extended = tuple.clone();
                    extended.push(right);
                    if level.accepts(&TupleView::new(problem, &extended)) {
                        next.push(extended);
                    }
                }
            }
            tuples = next;
        }

        tuples.retain(|tuple| {
            let view = TupleView::new(problem, tuple);
            self.exists.iter().all(|stage| {
                let found = stage.source.elements(problem).any(|e| {
                    problem
                        .row(e)
                        .is_some_and(|row| all_match(&stage.joiners, &view, &row))
                });
                found != stage.negated
            })
        });
        tuples
    }

    /// Human-readable outline, e.g. `for_each(Match) -> join(Team)[equal] -> filter`.
    pub fn describe(&self, descriptor: &ProblemDescriptor) -> String {
        let mut out = String::new();
        for (k, level) in self.levels.iter().enumerate() {
            let name = level.source.class_name(descriptor);
            if k == 0 {
                let _ = write!(out, "for_each({name})");
            } else {
                let _ = write!(out, " -> join({name}){:?}", level.joiners);
            }
            for _ in &level.filters {
                out.push_str(" -> filter");
            }
        }
        for stage in &self.exists {
            let op = if stage.negated {
                "if_not_exists"
            } else {
                "if_exists"
            };
            let name = stage.source.class_name(descriptor);
            let _ = write!(out, " -> {op}({name}){:?}", stage.joiners);
        }
        out
    }
}
