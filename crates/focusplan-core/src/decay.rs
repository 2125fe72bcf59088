//! Decay curves used for temporal urgency modeling.
//!
//! All inputs are in days. `sigmoid` and `exponential` return values in
//! [0, 1]; `hyperbolic` saturates toward its (capped) maximum.

/// Cap on the hyperbolic maximum.
pub const HYPERBOLIC_MAX_CAP: f64 = 0.5;

/// Logistic curve, decreasing in `x`: `1 / (1 + e^(steepness * (x - midpoint)))`.
pub fn sigmoid(x: f64, midpoint: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (steepness * (x - midpoint)).exp())
}

/// Half-life decay: `0.5^(x / half_life)`.
///
/// Negative `x` is treated as 0 so the result stays in [0, 1]. A
/// non-positive half-life decays immediately.
pub fn exponential(x: f64, half_life: f64) -> f64 {
    if half_life <= 0.0 {
        return if x <= 0.0 { 1.0 } else { 0.0 };
    }
    0.5_f64.powf(x.max(0.0) / half_life)
}

/// Saturating growth for overdue tasks: `max * x / (scale + x)`.
///
/// Defined for `x >= 0` (negative input yields 0); `max` is capped at
/// [`HYPERBOLIC_MAX_CAP`].
pub fn hyperbolic(x: f64, max: f64, scale: f64) -> f64 {
    let max = max.clamp(0.0, HYPERBOLIC_MAX_CAP);
    if x <= 0.0 {
        return 0.0;
    }
    let scale = scale.max(f64::EPSILON);
    max * x / (scale + x)
}

/// Which curve applies to a task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UrgencyCurve {
    /// Due date in the future (or now): days remaining
    Upcoming { days_until_due: f64 },
    /// Past due: days overdue
    Overdue { days_overdue: f64 },
    /// No due date: task age in days
    Undated { age_days: f64 },
}

impl UrgencyCurve {
    /// Select the curve from days until due (negative when overdue).
    pub fn select(days_until_due: Option<f64>, age_days: f64) -> Self {
        match days_until_due {
            Some(days) if days < 0.0 => UrgencyCurve::Overdue { days_overdue: -days },
            Some(days) => UrgencyCurve::Upcoming { days_until_due: days },
            None => UrgencyCurve::Undated { age_days },
        }
    }

    /// Urgency in [0, 1.5].
    pub fn urgency(&self) -> f64 {
        match *self {
            UrgencyCurve::Upcoming { days_until_due } => {
                sigmoid(days_until_due, 3.0, 1.0).max(0.5 * exponential(days_until_due, 7.0))
            }
            UrgencyCurve::Overdue { days_overdue } => 1.0 + hyperbolic(days_overdue, 0.5, 2.0),
            UrgencyCurve::Undated { age_days } => 0.2 + 0.2 * (1.0 - exponential(age_days, 30.0)),
        }
    }
}
