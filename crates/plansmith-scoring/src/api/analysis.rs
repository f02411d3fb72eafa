//! Score analysis types for detailed constraint tracking.
//!
//! A [`ScoreExplanation`] breaks a score down per constraint and per match;
//! an [`IndictmentMap`] turns the same matches around to show which facts
//! and entities carry the blame.

use std::collections::HashMap;

use plansmith_core::{ConstraintRef, ElementRef, Problem, Score, Value};

/// Justification for why a constraint matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintJustification {
    /// Facts and entities involved in the match.
    pub elements: Vec<ElementRef>,
    /// Key of the group for grouped constraints.
    pub group_key: Option<Value>,
    /// Human-readable description of why the constraint matched.
    pub description: String,
}

impl ConstraintJustification {
    /// Describes each element as `Class#id`.
    pub fn describe<S: Score>(problem: &Problem<S>, elements: Vec<ElementRef>) -> Self {
        let description = if elements.is_empty() {
            "No elements".to_string()
        } else {
            elements
                .iter()
                .map(|&e| element_label(problem, e))
                .collect::<Vec<_>>()
                .join(", ")
        };
        Self {
            elements,
            group_key: None,
            description,
        }
    }

    /// Creates a justification with a custom description.
    pub fn with_description(elements: Vec<ElementRef>, description: String) -> Self {
        Self {
            elements,
            group_key: None,
            description,
        }
    }

    pub fn for_group(elements: Vec<ElementRef>, key: Value, description: String) -> Self {
        Self {
            elements,
            group_key: Some(key),
            description,
        }
    }
}

/// `Class#id` label of a fact or entity.
pub fn element_label<S: Score>(problem: &Problem<S>, element: ElementRef) -> String {
    let descriptor = problem.descriptor();
    let class = match element {
        ElementRef::Fact { class, .. } => descriptor.fact_class_name(class),
        ElementRef::Entity(e) => descriptor.entity_class_name(e.class),
    };
    match problem.row(element) {
        Some(row) => format!("{class}#{}", row.id()),
        None => format!("{class}#?"),
    }
}

/// A detailed constraint match with element information.
#[derive(Debug, Clone)]
pub struct DetailedConstraintMatch<S: Score> {
    /// Reference to the constraint that matched.
    pub constraint_ref: ConstraintRef,
    /// Signed score impact of this match.
    pub score: S,
    pub justification: ConstraintJustification,
}

impl<S: Score> DetailedConstraintMatch<S> {
    pub fn new(
        constraint_ref: ConstraintRef,
        score: S,
        justification: ConstraintJustification,
    ) -> Self {
        Self {
            constraint_ref,
            score,
            justification,
        }
    }
}

/// Per-constraint breakdown in a score explanation.
#[derive(Debug, Clone)]
pub struct ConstraintAnalysis<S: Score> {
    pub constraint_ref: ConstraintRef,
    /// Constraint weight (score per unit of match weight).
    pub weight: S,
    /// Total score from this constraint.
    pub score: S,
    pub matches: Vec<DetailedConstraintMatch<S>>,
    /// Whether the highest non-zero weight level is a hard level.
    pub is_hard: bool,
}

impl<S: Score> ConstraintAnalysis<S> {
    pub fn new(
        constraint_ref: ConstraintRef,
        weight: S,
        score: S,
        matches: Vec<DetailedConstraintMatch<S>>,
        is_hard: bool,
    ) -> Self {
        Self {
            constraint_ref,
            weight,
            score,
            matches,
            is_hard,
        }
    }

    /// Returns the number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Returns the constraint name.
    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// Complete score explanation with per-constraint breakdown.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<S: Score> {
    /// The total score.
    pub score: S,
    /// Per-constraint breakdown, in declaration order.
    pub constraint_analyses: Vec<ConstraintAnalysis<S>>,
}

impl<S: Score> ScoreExplanation<S> {
    pub fn new(score: S, constraint_analyses: Vec<ConstraintAnalysis<S>>) -> Self {
        Self {
            score,
            constraint_analyses,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.score.is_feasible()
    }

    pub fn constraint(&self, name: &str) -> Option<&ConstraintAnalysis<S>> {
        self.constraint_analyses.iter().find(|a| a.name() == name)
    }

    /// Returns the total match count across all constraints.
    pub fn total_match_count(&self) -> usize {
        self.constraint_analyses.iter().map(|a| a.match_count()).sum()
    }

    /// Returns constraints with non-zero scores.
    pub fn non_zero_constraints(&self) -> Vec<&ConstraintAnalysis<S>> {
        self.constraint_analyses
            .iter()
            .filter(|a| a.score != S::zero())
            .collect()
    }

    /// Returns all detailed matches across all constraints.
    pub fn all_matches(&self) -> Vec<&DetailedConstraintMatch<S>> {
        self.constraint_analyses
            .iter()
            .flat_map(|a| &a.matches)
            .collect()
    }

    pub fn indictments(&self) -> IndictmentMap<S> {
        IndictmentMap::from_matches(self.all_matches().into_iter().cloned())
    }
}

/// Analysis of how a single element impacts the score.
#[derive(Debug, Clone)]
pub struct Indictment<S: Score> {
    pub element: ElementRef,
    /// Total score impact of the matches involving this element.
    pub score: S,
    /// Matches involving this element, grouped by constraint.
    pub constraint_matches: HashMap<ConstraintRef, Vec<DetailedConstraintMatch<S>>>,
}

impl<S: Score> Indictment<S> {
    pub fn new(element: ElementRef) -> Self {
        Self {
            element,
            score: S::zero(),
            constraint_matches: HashMap::new(),
        }
    }

    pub fn add_match(&mut self, constraint_match: DetailedConstraintMatch<S>) {
        self.score = self.score + constraint_match.score;
        self.constraint_matches
            .entry(constraint_match.constraint_ref.clone())
            .or_default()
            .push(constraint_match);
    }

    /// Returns the total number of constraint matches.
    pub fn match_count(&self) -> usize {
        self.constraint_matches.values().map(Vec::len).sum()
    }

    /// Returns the constraint refs for all violated constraints.
    pub fn violated_constraints(&self) -> Vec<&ConstraintRef> {
        self.constraint_matches.keys().collect()
    }

    /// Returns the number of distinct constraints matched.
    pub fn constraint_count(&self) -> usize {
        self.constraint_matches.len()
    }
}

/// Map of element indictments.
#[derive(Debug, Clone)]
pub struct IndictmentMap<S: Score> {
    pub indictments: HashMap<ElementRef, Indictment<S>>,
}

impl<S: Score> Default for IndictmentMap<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Score> IndictmentMap<S> {
    pub fn new() -> Self {
        Self {
            indictments: HashMap::new(),
        }
    }

    /// Builds an indictment map from detailed matches. A match counts once
    /// for each distinct element it involves.
    pub fn from_matches<I>(matches: I) -> Self
    where
        I: IntoIterator<Item = DetailedConstraintMatch<S>>,
    {
        let mut map = Self::new();
        for m in matches {
            let mut elements = m.justification.elements.clone();
            elements.sort();
            elements.dedup();
            for element in elements {
                map.indictments
                    .entry(element)
                    .or_insert_with(|| Indictment::new(element))
                    .add_match(m.clone());
            }
        }
        map
    }

    pub fn get(&self, element: &ElementRef) -> Option<&Indictment<S>> {
        self.indictments.get(element)
    }

    /// Elements sorted from most to least damaging.
    pub fn worst_elements(&self) -> Vec<ElementRef> {
        let mut elements: Vec<&Indictment<S>> = self.indictments.values().collect();
        elements.sort_by(|a, b| a.score.cmp(&b.score).then(a.element.cmp(&b.element)));
        elements.into_iter().map(|i| i.element).collect()
    }

    pub fn len(&self) -> usize {
        self.indictments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indictments.is_empty()
    }
}
