//! Shared test fixtures for plansmith crates.
//!
//! Each module declares one scheduling domain: its problem descriptor, its
//! constraints and seeded instance generators.
//!
//! - [`flight_crew`] - crew rostering onto flights (`HardSoftScore`)
//! - [`sports_league`] - round assignment for a double round robin (`HardSoftScore`)
//! - [`tournament`] - team slots per day with fairness (`HardMediumSoftDecimalScore`)
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! plansmith-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use plansmith_test::flight_crew;
//!
//! let problem = flight_crew::generate(7, 6, 5);
//! let graph = flight_crew::constraint_graph(Arc::clone(problem.descriptor()));
//! ```

pub mod flight_crew;
pub mod sports_league;
pub mod tournament;
