//! Calendar events that shape the day skeleton.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::task::TaskCategory;

/// Kind of calendar event, used for prep/decompress defaults and for
/// relating tasks to adjacent meetings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    ClientMeeting,
    TeamMeeting,
    OneOnOne,
    Presentation,
    Interview,
    Social,
    Personal,
    #[default]
    Other,
}

impl EventCategory {
    /// Default preparation minutes before an event of this category
    pub fn default_prep_minutes(&self) -> u32 {
        match self {
            EventCategory::Presentation => 30,
            EventCategory::ClientMeeting | EventCategory::Interview => 15,
            EventCategory::TeamMeeting | EventCategory::OneOnOne | EventCategory::Other => 5,
            EventCategory::Social | EventCategory::Personal => 0,
        }
    }

    /// Default decompression minutes after an event of this category
    pub fn default_decompress_minutes(&self) -> u32 {
        match self {
            EventCategory::Presentation => 15,
            EventCategory::ClientMeeting | EventCategory::Interview => 10,
            EventCategory::TeamMeeting | EventCategory::OneOnOne | EventCategory::Other => 5,
            EventCategory::Social | EventCategory::Personal => 0,
        }
    }

    /// Task categories that naturally follow up on (or prepare for) this
    /// kind of event.
    pub fn related_task_categories(&self) -> &'static [TaskCategory] {
        match self {
            EventCategory::ClientMeeting => &[TaskCategory::Communication, TaskCategory::Planning],
            EventCategory::TeamMeeting => &[TaskCategory::Planning, TaskCategory::Communication],
            EventCategory::OneOnOne => &[TaskCategory::Communication],
            EventCategory::Presentation => &[TaskCategory::Creative, TaskCategory::Planning],
            EventCategory::Interview => &[TaskCategory::Administrative, TaskCategory::Communication],
            EventCategory::Social | EventCategory::Personal => &[TaskCategory::Personal],
            EventCategory::Other => &[],
        }
    }

    /// Whether a task of the given category relates to this event
    pub fn relates_to(&self, category: TaskCategory) -> bool {
        self.related_task_categories().contains(&category)
    }
}

/// A calendar event for one computation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub category: EventCategory,
    /// Explicit prep minutes; falls back to the category default
    #[serde(default)]
    pub prep_minutes: Option<u32>,
    /// Explicit decompress minutes; falls back to the category default
    #[serde(default)]
    pub decompress_minutes: Option<u32>,
}

impl CalendarEvent {
    /// Create a new calendar event
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        category: EventCategory,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            category,
            prep_minutes: None,
            decompress_minutes: None,
        }
    }

    pub fn with_prep(mut self, minutes: u32) -> Self {
        self.prep_minutes = Some(minutes);
        self
    }

    pub fn with_decompress(mut self, minutes: u32) -> Self {
        self.decompress_minutes = Some(minutes);
        self
    }

    pub fn prep_minutes(&self) -> u32 {
        self.prep_minutes
            .unwrap_or_else(|| self.category.default_prep_minutes())
    }

    pub fn decompress_minutes(&self) -> u32 {
        self.decompress_minutes
            .unwrap_or_else(|| self.category.default_decompress_minutes())
    }

    /// Check if this event overlaps with a time range
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.end < self.start {
            return Err(InputError::InvalidTimeRange {
                event_id: self.id.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn category_defaults_apply_when_not_explicit() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let event = CalendarEvent::new(
            "e1",
            "Client sync",
            start,
            start + Duration::hours(1),
            EventCategory::ClientMeeting,
        );
        assert_eq!(event.prep_minutes(), 15);
        assert_eq!(event.decompress_minutes(), 10);

        let event = event.with_prep(0).with_decompress(20);
        assert_eq!(event.prep_minutes(), 0);
        assert_eq!(event.decompress_minutes(), 20);
    }

    #[test]
    fn overlap_is_half_open() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let end = start + Duration::hours(1);
        let event = CalendarEvent::new("e1", "Sync", start, end, EventCategory::TeamMeeting);
        assert!(event.overlaps(start - Duration::minutes(30), start + Duration::minutes(1)));
        assert!(!event.overlaps(end, end + Duration::hours(1)));
        assert!(!event.overlaps(start - Duration::hours(1), start));
    }

    #[test]
    fn inverted_event_is_rejected() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let event = CalendarEvent::new("e1", "Bad", start, start - Duration::minutes(5), EventCategory::Other);
        assert!(event.validate().is_err());
    }

    #[test]
    fn presentation_relates_to_creative_work() {
        assert!(EventCategory::Presentation.relates_to(TaskCategory::Creative));
        assert!(!EventCategory::Presentation.relates_to(TaskCategory::Administrative));
        assert!(!EventCategory::Other.relates_to(TaskCategory::Other));
    }
}
