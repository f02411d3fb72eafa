//! Heuristic components for solving
//!
//! This module contains:
//! - Moves: Operations that modify planning variables
//! - Selectors: Components that propose moves during local search

pub mod r#move;
pub mod selector;

pub use r#move::{ChangeMove, EitherMove, Move, MoveUndo, SwapMove};
pub use selector::{ChangeMoveSelector, MoveSelector, SwapMoveSelector, UnionMoveSelector};
