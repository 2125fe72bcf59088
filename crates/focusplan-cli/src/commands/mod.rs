pub mod energy;
pub mod plan;
pub mod prefs;
pub mod rank;
pub mod snapshot;
