//! Energy curve module.
//!
//! Estimates how much energy the user has at a given moment, from their
//! morning and afternoon peak-hour preferences.

mod curve;

pub use curve::{energy_at, fractional_hour, level_from_normalized, EnergyCurveModel, ENERGY_NORMALIZER};
