//! Deliverable priority scoring.
//!
//! Produces a scalar score per deliverable from three factors:
//! - Urgency: closer due dates score higher
//! - Impact: higher grade weight scores higher
//! - Effort: a larger share of remaining work scores higher
//!
//! The factor weights are fixed constants of the design. Existing plans only
//! reproduce if the formula stays byte-for-byte stable, so these are not
//! exposed for configuration.

use chrono::NaiveDate;

use crate::model::Deliverable;

/// Weight of the urgency factor.
pub const URGENCY_WEIGHT: f64 = 0.5;
/// Weight of the grade-impact factor.
pub const IMPACT_WEIGHT: f64 = 0.3;
/// Weight of the remaining-effort factor.
pub const EFFORT_WEIGHT: f64 = 0.2;

/// Whole days from `reference` until the due date, clamped at zero.
pub fn days_until_due(due_date: NaiveDate, reference: NaiveDate) -> i64 {
    (due_date - reference).num_days().max(0)
}

/// Priority score for a deliverable relative to a reference date.
///
/// `urgency = 1 / (days_until_due + 1)`, bounded in (0, 1] so due-today work
/// scores a full 1.0 and nothing divides by zero. Impact is the grade weight
/// normalized to 0-1. Effort is the remaining share of the estimate; a zero
/// estimate makes the share undefined and scores 0.
pub fn priority_score(deliverable: &Deliverable, reference: NaiveDate) -> f64 {
    let urgency = 1.0 / (days_until_due(deliverable.due_date, reference) as f64 + 1.0);
    let impact = deliverable.grade_weight / 100.0;
    let effort = if deliverable.estimated_hours > 0.0 {
        deliverable.remaining_hours() / deliverable.estimated_hours
    } else {
        0.0
    };

    URGENCY_WEIGHT * urgency + IMPACT_WEIGHT * impact + EFFORT_WEIGHT * effort
}
