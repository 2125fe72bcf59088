//! Circadian/ultradian energy model.
//!
//! Energy is modeled as a baseline plus the stronger of two Gaussian peaks
//! (morning and afternoon), minus a post-lunch dip, plus a small ultradian
//! oscillation. The model is pure: identical inputs give identical output.

use std::f64::consts::PI;

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::preferences::{fixed_offset, UserPreferences};

/// Divisor that maps raw energy onto [0, 1].
pub const ENERGY_NORMALIZER: f64 = 8.0;

const BASELINE: f64 = 2.5;
const MORNING_AMPLITUDE: f64 = 5.0;
const MORNING_WIDTH: f64 = 2.0;
const AFTERNOON_AMPLITUDE: f64 = 4.0;
const AFTERNOON_WIDTH: f64 = 2.5;
const LUNCH_DIP_AMPLITUDE: f64 = 1.5;
const LUNCH_DIP_CENTER: f64 = 13.5;
const LUNCH_DIP_WIDTH: f64 = 1.0;
const ULTRADIAN_AMPLITUDE: f64 = 0.3;
const ULTRADIAN_PERIOD_MINUTES: f64 = 90.0;

fn gaussian(x: f64, center: f64, width: f64) -> f64 {
    (-(x - center).powi(2) / (2.0 * width * width)).exp()
}

/// Fractional hour of day on `time`'s own clock, e.g. 13:30 -> 13.5.
pub fn fractional_hour<Tz: TimeZone>(time: DateTime<Tz>) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0 + time.second() as f64 / 3600.0
}

/// Raw energy estimate at `time` (typically 0-8).
pub fn energy_at<Tz: TimeZone>(time: DateTime<Tz>, morning_peak_hour: f64, afternoon_peak_hour: f64) -> f64 {
    let minute_of_hour = time.minute() as f64;
    let hour = fractional_hour(time);

    let morning = MORNING_AMPLITUDE * gaussian(hour, morning_peak_hour, MORNING_WIDTH);
    let afternoon = AFTERNOON_AMPLITUDE * gaussian(hour, afternoon_peak_hour, AFTERNOON_WIDTH);
    let lunch_dip = if (12.5..=14.5).contains(&hour) {
        LUNCH_DIP_AMPLITUDE * gaussian(hour, LUNCH_DIP_CENTER, LUNCH_DIP_WIDTH)
    } else {
        0.0
    };
    let ultradian = ULTRADIAN_AMPLITUDE
        * (2.0 * PI * (minute_of_hour % ULTRADIAN_PERIOD_MINUTES) / ULTRADIAN_PERIOD_MINUTES).sin();

    BASELINE + morning.max(afternoon) - lunch_dip + ultradian
}

/// Energy model parameterized by the user's peak hours, which are read on
/// the user's local clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyCurveModel {
    pub morning_peak_hour: f64,
    pub afternoon_peak_hour: f64,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for EnergyCurveModel {
    fn default() -> Self {
        Self::new(10.0, 15.0)
    }
}

impl EnergyCurveModel {
    pub fn new(morning_peak_hour: f64, afternoon_peak_hour: f64) -> Self {
        Self {
            morning_peak_hour,
            afternoon_peak_hour,
            utc_offset_minutes: 0,
        }
    }

    pub fn from_preferences(prefs: &UserPreferences) -> Self {
        Self::new(prefs.morning_peak_hour, prefs.afternoon_peak_hour)
            .with_utc_offset(prefs.utc_offset_minutes)
    }

    pub fn with_utc_offset(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Raw energy at `time`.
    pub fn energy_at(&self, time: DateTime<Utc>) -> f64 {
        let local = time.with_timezone(&fixed_offset(self.utc_offset_minutes));
        energy_at(local, self.morning_peak_hour, self.afternoon_peak_hour)
    }

    /// Energy mapped onto [0, 1].
    pub fn normalized_at(&self, time: DateTime<Utc>) -> f64 {
        (self.energy_at(time) / ENERGY_NORMALIZER).clamp(0.0, 1.0)
    }

    /// Energy bucketed onto the 1-5 scale used by task requirements.
    pub fn level_at(&self, time: DateTime<Utc>) -> u8 {
        level_from_normalized(self.normalized_at(time))
    }

    /// Render the modeled curve for one local day as an ASCII chart, one
    /// row per local hour between `from_hour` and `to_hour` (inclusive).
    pub fn render_ascii_chart(&self, date: NaiveDate, from_hour: u32, to_hour: u32) -> String {
        let mut output = format!("\nEnergy Curve for {}:\n", date.format("%A %Y-%m-%d"));
        output.push_str(&"─".repeat(50));
        output.push('\n');

        for hour in from_hour.min(23)..=to_hour.min(23) {
            let Some(time) = date
                .and_hms_opt(hour, 0, 0)
                .and_then(|t| t.and_local_timezone(fixed_offset(self.utc_offset_minutes)).single())
                .map(|t| t.with_timezone(&Utc))
            else {
                continue;
            };
            let energy = self.normalized_at(time);
            let bar_length = (energy * 30.0).round() as usize;
            let bar = "█".repeat(bar_length);
            let empty = " ".repeat(30usize.saturating_sub(bar_length));

            output.push_str(&format!(
                "{:02}:00 {}{} L{} {:.0}%\n",
                hour,
                bar,
                empty,
                level_from_normalized(energy),
                energy * 100.0
            ));
        }

        output.push_str(&"─".repeat(50));
        output.push('\n');
        output
    }
}

/// Map [0, 1] energy onto levels 1-5.
pub fn level_from_normalized(normalized: f64) -> u8 {
    ((normalized * 5.0).ceil() as i64).clamp(1, 5) as u8
}
