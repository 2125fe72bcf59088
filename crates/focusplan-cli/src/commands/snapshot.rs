//! Snapshot loading shared by `rank` and `plan`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use focusplan_core::{CalendarEvent, Task, UserPreferences};
use serde::Deserialize;
use tracing::debug;

/// Tasks and events as exported by a task store.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| format!("invalid snapshot {}: {e}", path.display()))?;
        debug!(
            tasks = snapshot.tasks.len(),
            events = snapshot.events.len(),
            embedded_prefs = snapshot.preferences.is_some(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// `--now` wins over the snapshot's own timestamp, which wins over the clock.
    pub fn resolve_now(&self, flag: Option<&str>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
        match flag {
            Some(raw) => parse_now(raw),
            None => Ok(self.now.unwrap_or_else(Utc::now)),
        }
    }

    /// Embedded preferences, else the preferences file, else defaults.
    pub fn resolve_preferences(
        &self,
        file: Option<&Path>,
    ) -> Result<UserPreferences, Box<dyn std::error::Error>> {
        match &self.preferences {
            Some(prefs) => Ok(prefs.clone()),
            None => load_preferences(file),
        }
    }
}

/// Read preferences without creating the file when it is missing.
pub fn load_preferences(file: Option<&Path>) -> Result<UserPreferences, Box<dyn std::error::Error>> {
    let path = preferences_path(file)?;
    if path.exists() {
        Ok(UserPreferences::load(&path)?)
    } else {
        Ok(UserPreferences::default())
    }
}

pub fn preferences_path(file: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match file {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(UserPreferences::default_path()?),
    }
}

pub fn parse_now(raw: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| format!("invalid --now '{raw}': {e}"))?;
    Ok(parsed.with_timezone(&Utc))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{raw}' (expected YYYY-MM-DD): {e}"))?;
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_snapshot() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"tasks": []}"#).unwrap();
        assert!(snapshot.events.is_empty());
        assert!(snapshot.preferences.is_none());
        assert!(snapshot.now.is_none());
    }

    #[test]
    fn flag_overrides_snapshot_now() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"tasks": [], "now": "2025-03-10T08:30:00Z"}"#).unwrap();
        let now = snapshot.resolve_now(Some("2025-03-11T09:00:00+00:00")).unwrap();
        assert_eq!(now.to_rfc3339(), "2025-03-11T09:00:00+00:00");
        let fallback = snapshot.resolve_now(None).unwrap();
        assert_eq!(fallback.to_rfc3339(), "2025-03-10T08:30:00+00:00");
    }

    #[test]
    fn rejects_bad_date() {
        assert!(parse_date("10/03/2025").is_err());
        assert!(parse_date("2025-03-10").is_ok());
    }
}
