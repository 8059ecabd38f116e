//! Progress reporting and replanning commands.

use chrono::Local;
use clap::Subcommand;
use studyflow_core::{Config, ProgressEvent, SessionStatus};

use super::common;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Report progress on a planned session and replan the rest of the week
    Log {
        /// Session ID
        session_id: String,
        /// Outcome: completed, partial or missed
        status: String,
        /// Hours actually spent; required for partial
        #[arg(long)]
        actual_hours: Option<f64>,
    },
    /// Show executed sessions for a deliverable, newest first
    History {
        /// Deliverable ID
        deliverable_id: String,
    },
}

fn parse_status(status: &str) -> Result<SessionStatus, String> {
    match status {
        "completed" => Ok(SessionStatus::Completed),
        "partial" => Ok(SessionStatus::Partial),
        "missed" => Ok(SessionStatus::Missed),
        other => Err(format!(
            "unknown status '{other}', expected completed, partial or missed"
        )),
    }
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut db = common::open_db(&config)?;

    match action {
        ProgressAction::Log {
            session_id,
            status,
            actual_hours,
        } => {
            let event = ProgressEvent {
                session_id,
                status: parse_status(&status)?,
                actual_hours,
            };
            let today = Local::now().date_naive();
            let summary = db.apply_progress(&config.user, &event, today)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        ProgressAction::History { deliverable_id } => {
            let history = db.progress_history(&deliverable_id)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
    }
    Ok(())
}
