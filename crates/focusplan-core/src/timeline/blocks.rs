//! Time block types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{CalendarEvent, EventCategory};

/// Kind of a time block in the day plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    MeetingPrep,
    Meeting,
    MeetingDecompress,
    DeepWork,
    ShallowWork,
    Admin,
    Break,
    Buffer,
    Available,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MeetingPrep => "meeting-prep",
            Self::Meeting => "meeting",
            Self::MeetingDecompress => "meeting-decompress",
            Self::DeepWork => "deep-work",
            Self::ShallowWork => "shallow-work",
            Self::Admin => "admin",
            Self::Break => "break",
            Self::Buffer => "buffer",
            Self::Available => "available",
        }
    }

    /// Blocks derived from a calendar event.
    pub fn is_meeting_related(&self) -> bool {
        matches!(self, Self::MeetingPrep | Self::Meeting | Self::MeetingDecompress)
    }

    /// Blocks holding scheduled task work.
    pub fn is_work(&self) -> bool {
        matches!(self, Self::DeepWork | Self::ShallowWork | Self::Admin)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse capacity of an available block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    DeepWorkViable,
    ShallowOnly,
}

impl Capacity {
    pub fn classify(minutes: i64, deep_work_min_minutes: u32) -> Self {
        if minutes >= deep_work_min_minutes as i64 {
            Self::DeepWorkViable
        } else {
            Self::ShallowOnly
        }
    }
}

/// One contiguous span of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Stable ID derived from kind and span
    pub id: Uuid,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub task_ids: Vec<String>,
    /// Category of the event this block belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_category: Option<EventCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
    /// Modeled energy level (1-5) at the block's midpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<u8>,
}

impl TimeBlock {
    pub fn new(block_type: BlockType, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: block_id(block_type, start, end),
            block_type,
            start,
            end,
            task_ids: Vec::new(),
            source_category: None,
            source_event_id: None,
            capacity: None,
            energy_level: None,
        }
    }

    /// Link the block to the event it was derived from.
    pub fn from_event(mut self, event: &CalendarEvent) -> Self {
        self.source_category = Some(event.category);
        self.source_event_id = Some(event.id.clone());
        self
    }

    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_energy_level(mut self, level: u8) -> Self {
        self.energy_level = Some(level);
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_ids.push(task_id.into());
        self
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + (self.end - self.start) / 2
    }

    pub fn is_available(&self) -> bool {
        self.block_type == BlockType::Available
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

fn block_id(block_type: BlockType, start: DateTime<Utc>, end: DateTime<Utc>) -> Uuid {
    let name = format!("{}:{}:{}", block_type, start.to_rfc3339(), end.to_rfc3339());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}
