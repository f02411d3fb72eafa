//! Score explanation and runtime weight configuration.

pub mod analysis;
pub mod weight_overrides;
