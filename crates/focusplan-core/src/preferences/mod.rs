//! TOML-based user preferences.
//!
//! Stores everything the engine reads about the user:
//! - Work hours, work days and the UTC offset they are expressed in
//! - Energy peak hours
//! - Minimum usable and deep-work block sizes
//! - Weight sliders for the ten scoring dimensions
//!
//! Preferences are stored at `~/.config/focusplan/preferences.toml`, but the
//! engine itself only ever receives an in-memory [`UserPreferences`].

mod presets;

pub use presets::{apply_patch, preset, preset_names, PreferencePatch};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InputError};

/// Blocked-task penalty at or above which blocked tasks are excluded.
pub const BLOCKED_EXCLUDE_THRESHOLD: u32 = 100;

/// Weight sliders, each 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPreferences {
    #[serde(default = "default_70")]
    pub urgency: u32,
    #[serde(default = "default_50")]
    pub energy: u32,
    #[serde(default = "default_50")]
    pub context: u32,
    #[serde(default = "default_50")]
    pub similar_work: u32,
    #[serde(default = "default_60")]
    pub deep_work: u32,
    #[serde(default = "default_30")]
    pub stakeholder: u32,
    #[serde(default = "default_40")]
    pub tag: u32,
    #[serde(default = "default_100")]
    pub blocked_penalty: u32,
    #[serde(default = "default_50")]
    pub importance: u32,
    #[serde(default = "default_40")]
    pub effort: u32,
    #[serde(default = "default_40")]
    pub momentum: u32,
    #[serde(default = "default_50")]
    pub dependency: u32,
    #[serde(default = "default_30")]
    pub staleness: u32,
    #[serde(default = "default_40")]
    pub opportunity_cost: u32,
}

/// A recurring break window inside the work day, e.g. lunch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakWindow {
    /// Start time, HH:MM
    pub start: String,
    pub minutes: u32,
}

/// User preferences consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Work day start, HH:MM
    #[serde(default = "default_work_start")]
    pub work_start: String,
    /// Work day end, HH:MM
    #[serde(default = "default_work_end")]
    pub work_end: String,
    /// Work days, 0=Mon ... 6=Sun
    #[serde(default = "default_work_days")]
    pub work_days: Vec<u8>,
    /// Offset of the user's local clock from UTC, in minutes (UTC-5 is -300).
    /// Work hours, breaks, energy peaks and the time-of-day rules are all
    /// read on this clock.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_morning_peak")]
    pub morning_peak_hour: f64,
    #[serde(default = "default_afternoon_peak")]
    pub afternoon_peak_hour: f64,
    /// Smallest free interval worth scheduling into
    #[serde(default = "default_min_block_minutes")]
    pub min_block_minutes: u32,
    /// Smallest block that counts as deep-work viable
    #[serde(default = "default_deep_work_min_minutes")]
    pub deep_work_min_minutes: u32,
    /// A task due within this many days counts as urgent
    #[serde(default = "default_urgent_window_days")]
    pub urgent_window_days: u32,
    /// Contexts available right now
    #[serde(default)]
    pub active_contexts: Vec<String>,
    /// Tags the user wants boosted
    #[serde(default)]
    pub priority_tags: Vec<String>,
    #[serde(default)]
    pub breaks: Vec<BreakWindow>,
    #[serde(default)]
    pub weights: WeightPreferences,
}

// Default functions
fn default_work_start() -> String {
    "09:00".into()
}
fn default_work_end() -> String {
    "17:00".into()
}
fn default_work_days() -> Vec<u8> {
    vec![0, 1, 2, 3, 4]
}
fn default_morning_peak() -> f64 {
    10.0
}
fn default_afternoon_peak() -> f64 {
    15.0
}
fn default_min_block_minutes() -> u32 {
    15
}
fn default_deep_work_min_minutes() -> u32 {
    60
}
fn default_urgent_window_days() -> u32 {
    2
}
fn default_30() -> u32 {
    30
}
fn default_40() -> u32 {
    40
}
fn default_50() -> u32 {
    50
}
fn default_60() -> u32 {
    60
}
fn default_70() -> u32 {
    70
}
fn default_100() -> u32 {
    100
}

impl Default for WeightPreferences {
    fn default() -> Self {
        Self {
            urgency: 70,
            energy: 50,
            context: 50,
            similar_work: 50,
            deep_work: 60,
            stakeholder: 30,
            tag: 40,
            blocked_penalty: 100,
            importance: 50,
            effort: 40,
            momentum: 40,
            dependency: 50,
            staleness: 30,
            opportunity_cost: 40,
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            work_start: default_work_start(),
            work_end: default_work_end(),
            work_days: default_work_days(),
            utc_offset_minutes: 0,
            morning_peak_hour: default_morning_peak(),
            afternoon_peak_hour: default_afternoon_peak(),
            min_block_minutes: default_min_block_minutes(),
            deep_work_min_minutes: default_deep_work_min_minutes(),
            urgent_window_days: default_urgent_window_days(),
            active_contexts: Vec::new(),
            priority_tags: Vec::new(),
            breaks: Vec::new(),
            weights: WeightPreferences::default(),
        }
    }
}

/// Largest accepted distance from UTC.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Fixed offset for `minutes` east of UTC, falling back to UTC when out of range.
pub fn fixed_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Parse an "HH:MM" string.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

impl UserPreferences {
    /// Whether blocked tasks are dropped entirely.
    pub fn excludes_blocked(&self) -> bool {
        self.weights.blocked_penalty >= BLOCKED_EXCLUDE_THRESHOLD
    }

    /// Whether the date falls on one of the configured work days.
    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_monday() as u8;
        self.work_days.contains(&weekday)
    }

    pub fn utc_offset(&self) -> FixedOffset {
        fixed_offset(self.utc_offset_minutes)
    }

    /// The instant of local wall-clock `time` on local `date`.
    pub fn local_instant(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local_minus_utc = Duration::seconds(self.utc_offset().local_minus_utc() as i64);
        (date.and_time(time) - local_minus_utc).and_utc()
    }

    /// Local hour of day at `time`.
    pub fn local_hour(&self, time: DateTime<Utc>) -> u32 {
        time.with_timezone(&self.utc_offset()).hour()
    }

    /// Local calendar date at `time`.
    pub fn local_date(&self, time: DateTime<Utc>) -> NaiveDate {
        time.with_timezone(&self.utc_offset()).date_naive()
    }

    /// Work day bounds for a local date, or `None` if the hours are invalid.
    pub fn work_day_bounds(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = parse_hhmm(&self.work_start)?;
        let end = parse_hhmm(&self.work_end)?;
        if end <= start {
            return None;
        }
        Some((self.local_instant(date, start), self.local_instant(date, end)))
    }

    /// Length of one work day in minutes (0 when the hours are invalid).
    pub fn workday_minutes(&self) -> i64 {
        match (parse_hhmm(&self.work_start), parse_hhmm(&self.work_end)) {
            (Some(start), Some(end)) if end > start => (end - start).num_minutes(),
            _ => 0,
        }
    }

    /// Check that work hours parse and are ordered, and that the UTC
    /// offset is a real one.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(InputError::InvalidUtcOffset {
                minutes: self.utc_offset_minutes,
            });
        }
        match (parse_hhmm(&self.work_start), parse_hhmm(&self.work_end)) {
            (Some(start), Some(end)) if end > start => Ok(()),
            _ => Err(InputError::InvalidWorkHours {
                start: self.work_start.clone(),
                end: self.work_end.clone(),
            }),
        }
    }

    /// Parse preferences from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Default preferences file location.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("preferences.toml"))
    }

    /// Load from disk or return (and write) the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed,
    /// or if the default file cannot be written.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let prefs = Self::default();
                prefs.save(path)?;
                Ok(prefs)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    /// Persist to disk.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from the given path, returning defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Get a preference value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Return a copy with one value replaced, parsed according to the
    /// type currently stored at `key`.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self, ConfigError> {
        let mut json = serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        set_json_value_by_path(&mut json, key, value)?;
        serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Set a value in place. Returns error if the key is unknown or the
    /// value does not fit the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        *self = self.with_value(key, value)?;
        Ok(())
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };
    let mut parts = key.split('.').peekable();
    if key.is_empty() {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    }

    Err(ConfigError::UnknownKey(key.to_string()))
}

/// Returns `~/.config/focusplan[-dev]/` based on FOCUSPLAN_ENV.
///
/// Set FOCUSPLAN_ENV=dev to use the development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusplan-dev")
    } else {
        base_dir.join("focusplan")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
