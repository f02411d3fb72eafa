//! Moves: atomic changes to planning variables.
//!
//! - `ChangeMove` assigns a value to one variable
//! - `SwapMove` exchanges variable values between two entities
//! - `EitherMove` is either of the two
//!
//! Every move goes through the score director, so the score stays current,
//! and returns a `MoveUndo` to revert it.

mod change;
mod either;
mod swap;
mod traits;


pub use change::ChangeMove;
pub use either::EitherMove;
pub use swap::SwapMove;
pub use traits::{Move, MoveUndo};
