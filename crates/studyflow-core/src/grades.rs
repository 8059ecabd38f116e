//! Course grade projection and target-score solving.
//!
//! Read-only companion to the planner, computed fresh from deliverable rows
//! on every query:
//! - [`project`]: current grade over executed-and-scored work, plus a
//!   projection that assumes 75% on everything still outstanding
//! - [`solve_target`]: the average score needed on remaining weighted work
//!   to reach a target grade, solved linearly
//!
//! Degenerate inputs (no scored work, zero total weight, zero remaining
//! weight) are expected states, handled by branches that report absent
//! values rather than errors.

use serde::Serialize;

use crate::model::Deliverable;

/// Assumed score on not-yet-scored work when projecting, as a fraction.
pub const ASSUMED_REMAINING_SCORE: f64 = 0.75;

/// Per-deliverable line in a grade snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct GradeLine {
    pub name: String,
    pub weight: f64,
    pub score: Option<f64>,
    /// Fully executed, independent of whether a score exists
    pub completed: bool,
}

/// Computed view of a course's grade state. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CourseGradeSnapshot {
    /// Weighted average over scored-and-executed work; absent until any exists
    pub current_grade: Option<f64>,
    pub completed_weight: f64,
    pub total_weight: f64,
    /// Blend of the current grade with the 75% assumption on remaining weight
    pub projected_grade: Option<f64>,
    pub deliverables: Vec<GradeLine>,
}

/// Outcome of solving for a target grade.
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    pub target_grade: f64,
    pub current_grade: Option<f64>,
    /// Absent when unachievable or when no average is needed
    pub required_average: Option<f64>,
    pub remaining_weight: f64,
    pub achievable: bool,
    pub message: String,
}

/// A deliverable counts toward the current grade only once it is both scored
/// and fully executed. A score on unfinished work contributes nothing yet.
fn counts_as_completed(d: &Deliverable) -> bool {
    d.score.is_some() && d.is_done()
}

/// Compute the grade snapshot for one course's deliverables.
pub fn project(deliverables: &[Deliverable]) -> CourseGradeSnapshot {
    if deliverables.is_empty() {
        return CourseGradeSnapshot {
            current_grade: None,
            completed_weight: 0.0,
            total_weight: 0.0,
            projected_grade: None,
            deliverables: Vec::new(),
        };
    }

    let total_weight: f64 = deliverables.iter().map(|d| d.grade_weight).sum();

    let mut weighted_sum = 0.0;
    let mut completed_weight = 0.0;
    for d in deliverables.iter().filter(|d| counts_as_completed(d)) {
        // counts_as_completed guarantees the score is present
        let score = d.score.unwrap_or(0.0);
        weighted_sum += score * d.grade_weight / 100.0;
        completed_weight += d.grade_weight;
    }

    let current_grade = if completed_weight > 0.0 {
        Some(weighted_sum / completed_weight * 100.0)
    } else {
        None
    };

    let remaining_weight = total_weight - completed_weight;
    let projected_grade = match current_grade {
        Some(current) if remaining_weight > 0.0 => {
            let current_contribution = current / 100.0 * completed_weight;
            let remaining_contribution = ASSUMED_REMAINING_SCORE * remaining_weight;
            Some((current_contribution + remaining_contribution) / total_weight * 100.0)
        }
        Some(current) => Some(current),
        None => None,
    };

    CourseGradeSnapshot {
        current_grade,
        completed_weight,
        total_weight,
        projected_grade,
        deliverables: deliverables
            .iter()
            .map(|d| GradeLine {
                name: d.name.clone(),
                weight: d.grade_weight,
                score: d.score,
                completed: d.is_done(),
            })
            .collect(),
    }
}

/// Solve for the average score needed on remaining work to hit `target_grade`.
pub fn solve_target(deliverables: &[Deliverable], target_grade: f64) -> TargetOutcome {
    let snapshot = project(deliverables);

    if snapshot.total_weight == 0.0 {
        return TargetOutcome {
            target_grade,
            current_grade: None,
            required_average: None,
            remaining_weight: 0.0,
            achievable: false,
            message: "No deliverables found for this course".to_string(),
        };
    }

    let remaining_weight = snapshot.total_weight - snapshot.completed_weight;

    if remaining_weight == 0.0 {
        let achieved = snapshot
            .current_grade
            .map(|g| g >= target_grade)
            .unwrap_or(false);
        return TargetOutcome {
            target_grade,
            current_grade: snapshot.current_grade,
            required_average: None,
            remaining_weight: 0.0,
            achievable: achieved,
            message: if achieved {
                "Target already achieved!".to_string()
            } else {
                "All work completed. Target not achieved.".to_string()
            },
        };
    }

    // target = (current_contribution + required * remaining_weight) / total_weight
    let current_contribution = snapshot
        .current_grade
        .map(|g| g / 100.0 * snapshot.completed_weight)
        .unwrap_or(0.0);
    let required_average =
        ((target_grade / 100.0) * snapshot.total_weight - current_contribution) / remaining_weight
            * 100.0;

    let achievable = (0.0..=100.0).contains(&required_average);
    let message = if required_average > 100.0 {
        "Target grade is not achievable even with perfect scores on remaining work".to_string()
    } else if required_average < 0.0 {
        "Target grade is already guaranteed!".to_string()
    } else {
        format!(
            "You need to average {required_average:.1}% on remaining work to achieve {target_grade}%"
        )
    };

    TargetOutcome {
        target_grade,
        current_grade: snapshot.current_grade,
        required_average: achievable.then_some(required_average),
        remaining_weight,
        achievable,
        message,
    }
}
