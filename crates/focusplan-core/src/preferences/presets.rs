//! Settings presets as declarative patches.
//!
//! A preset is a table of `{field, value}` pairs. One generic function,
//! [`apply_patch`], applies any table through the dot-path setter, so
//! presets stay plain data.

use crate::error::ConfigError;

use super::UserPreferences;

/// One preference assignment: dot-path field and its textual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferencePatch {
    pub field: &'static str,
    pub value: &'static str,
}

const fn patch(field: &'static str, value: &'static str) -> PreferencePatch {
    PreferencePatch { field, value }
}

const BALANCED: &[PreferencePatch] = &[
    patch("weights.urgency", "70"),
    patch("weights.importance", "50"),
    patch("weights.effort", "40"),
    patch("weights.context", "50"),
    patch("weights.energy", "50"),
    patch("weights.momentum", "40"),
    patch("weights.dependency", "50"),
    patch("weights.staleness", "30"),
    patch("weights.opportunity_cost", "40"),
    patch("weights.similar_work", "50"),
    patch("weights.deep_work", "60"),
];

const DEADLINE_CRUNCH: &[PreferencePatch] = &[
    patch("weights.urgency", "95"),
    patch("weights.opportunity_cost", "70"),
    patch("weights.dependency", "65"),
    patch("weights.staleness", "10"),
    patch("weights.similar_work", "30"),
    patch("weights.deep_work", "40"),
    patch("urgent_window_days", "3"),
];

const DEEP_FOCUS: &[PreferencePatch] = &[
    patch("weights.deep_work", "90"),
    patch("weights.context", "70"),
    patch("weights.similar_work", "70"),
    patch("weights.effort", "20"),
    patch("deep_work_min_minutes", "90"),
    patch("min_block_minutes", "25"),
];

const GENTLE: &[PreferencePatch] = &[
    patch("weights.energy", "80"),
    patch("weights.effort", "70"),
    patch("weights.urgency", "50"),
    patch("weights.staleness", "20"),
    patch("weights.blocked_penalty", "100"),
];

const PRESETS: &[(&str, &[PreferencePatch])] = &[
    ("balanced", BALANCED),
    ("deadline_crunch", DEADLINE_CRUNCH),
    ("deep_focus", DEEP_FOCUS),
    ("gentle", GENTLE),
];

/// Names of all built-in presets.
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}

/// Look up a preset's patch table by name.
pub fn preset(name: &str) -> Result<&'static [PreferencePatch], ConfigError> {
    PRESETS
        .iter()
        .find(|(preset_name, _)| *preset_name == name)
        .map(|(_, patches)| *patches)
        .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
}

/// Apply a patch table, returning new preferences. The input is untouched;
/// on the first failing entry the whole patch is rejected.
pub fn apply_patch(
    prefs: &UserPreferences,
    patches: &[PreferencePatch],
) -> Result<UserPreferences, ConfigError> {
    patches
        .iter()
        .try_fold(prefs.clone(), |acc, p| acc.with_value(p.field, p.value))
}
