//! Day skeleton generation from calendar events.
//!
//! Events are walked in chronological order. Each one contributes a
//! `meeting` block plus, room permitting, `meeting-prep` right before it and
//! `meeting-decompress` right after it. Configured breaks are laid into
//! whatever is still free, and the remaining gaps become `available`
//! blocks (or `buffer` when shorter than the minimum usable block).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use super::blocks::{BlockType, Capacity, TimeBlock};
use crate::calendar::CalendarEvent;
use crate::energy::EnergyCurveModel;
use crate::preferences::{parse_hhmm, UserPreferences};

/// Builds the time block skeleton of one work day.
pub struct TimeBlockGenerator<'a> {
    prefs: &'a UserPreferences,
    energy: EnergyCurveModel,
}

impl<'a> TimeBlockGenerator<'a> {
    pub fn new(prefs: &'a UserPreferences) -> Self {
        Self {
            prefs,
            energy: EnergyCurveModel::from_preferences(prefs),
        }
    }

    /// Skeleton for `date`, chronologically ordered and non-overlapping.
    ///
    /// Returns no blocks on non-work days or when the work hours are invalid.
    pub fn generate(&self, events: &[CalendarEvent], date: NaiveDate) -> Vec<TimeBlock> {
        if !self.prefs.is_work_day(date) {
            debug!(%date, "not a work day, empty skeleton");
            return Vec::new();
        }
        let Some((day_start, day_end)) = self.prefs.work_day_bounds(date) else {
            debug!(%date, "work hours unusable, empty skeleton");
            return Vec::new();
        };

        let mut fixed = self.event_blocks(events, day_start, day_end);
        self.place_breaks(&mut fixed, date, day_start, day_end);
        fixed.sort_by_key(|b| (b.start, b.end));

        let blocks = self.fill_gaps(fixed, day_start, day_end);
        debug!(%date, blocks = blocks.len(), "generated day skeleton");
        blocks
    }

    fn event_blocks(
        &self,
        events: &[CalendarEvent],
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Vec<TimeBlock> {
        let mut sorted: Vec<&CalendarEvent> = events
            .iter()
            .filter(|e| e.end > e.start && e.overlaps(day_start, day_end))
            .collect();
        sorted.sort_by_key(|e| (e.start, e.end));

        let mut blocks: Vec<TimeBlock> = Vec::new();
        let mut last_end = day_start;

        for (i, event) in sorted.iter().enumerate() {
            let start = event.start.max(day_start).max(last_end);
            let end = event.end.min(day_end);
            if start >= end {
                continue;
            }

            let prep = Duration::minutes(event.prep_minutes() as i64);
            let prep_start = start - prep;
            let prep_fits = prep > Duration::zero()
                && start == event.start
                && prep_start >= day_start
                && blocks.last().map_or(true, |b| b.end <= prep_start);
            if prep_fits {
                blocks.push(TimeBlock::new(BlockType::MeetingPrep, prep_start, start).from_event(event));
            }

            blocks.push(TimeBlock::new(BlockType::Meeting, start, end).from_event(event));
            last_end = end;

            let decompress = Duration::minutes(event.decompress_minutes() as i64);
            let decompress_end = end + decompress;
            // Events swallowed by this one are never placed, so only the next
            // event reaching past it can crowd out the decompress block.
            let next_start = sorted[i + 1..]
                .iter()
                .find(|next| next.end.min(day_end) > end)
                .map(|next| next.start);
            let decompress_fits = decompress > Duration::zero()
                && end == event.end
                && decompress_end <= day_end
                && next_start.map_or(true, |next| next >= decompress_end);
            if decompress_fits {
                blocks.push(
                    TimeBlock::new(BlockType::MeetingDecompress, end, decompress_end).from_event(event),
                );
                last_end = decompress_end;
            }
        }

        blocks
    }

    /// Add configured breaks that fit inside the day without touching any
    /// event-derived block.
    fn place_breaks(
        &self,
        fixed: &mut Vec<TimeBlock>,
        date: NaiveDate,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) {
        for window in &self.prefs.breaks {
            let Some(time) = parse_hhmm(&window.start) else {
                continue;
            };
            let start = self.prefs.local_instant(date, time);
            let end = start + Duration::minutes(window.minutes as i64);
            if window.minutes == 0 || start < day_start || end > day_end {
                continue;
            }
            if fixed.iter().any(|b| b.overlaps(start, end)) {
                debug!(start = %window.start, "break overlaps calendar, skipped");
                continue;
            }
            fixed.push(TimeBlock::new(BlockType::Break, start, end));
        }
    }

    fn fill_gaps(
        &self,
        fixed: Vec<TimeBlock>,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Vec<TimeBlock> {
        let mut blocks = Vec::with_capacity(fixed.len() * 2 + 1);
        let mut cursor = day_start;
        for block in fixed {
            if block.start > cursor {
                blocks.push(self.free_block(cursor, block.start));
            }
            cursor = cursor.max(block.end);
            blocks.push(block);
        }
        if cursor < day_end {
            blocks.push(self.free_block(cursor, day_end));
        }
        blocks
    }

    /// `available` block with capacity and energy, or a `buffer` when the
    /// gap is too short to use.
    pub fn free_block(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> TimeBlock {
        let minutes = (end - start).num_minutes();
        if minutes < self.prefs.min_block_minutes as i64 {
            return TimeBlock::new(BlockType::Buffer, start, end);
        }
        self.available_block(start, end)
    }

    /// `available` block annotated with capacity and midpoint energy.
    pub fn available_block(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> TimeBlock {
        let block = TimeBlock::new(BlockType::Available, start, end);
        let capacity = Capacity::classify(block.duration_minutes(), self.prefs.deep_work_min_minutes);
        let level = self.energy.level_at(block.midpoint());
        block.with_capacity(capacity).with_energy_level(level)
    }
}
