//! Weekly plan commands.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use studyflow_core::{planner, Config};

use super::common;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Generate a 7-day plan and replace the current future plan
    Generate {
        /// First day of the plan (YYYY-MM-DD, default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Show the week's sessions with course and deliverable names
    Show {
        /// First day of the window (YYYY-MM-DD, default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = common::open_db(&config)?;

    match action {
        PlanAction::Generate { start } => {
            let start = start.unwrap_or_else(|| Local::now().date_naive());
            let sessions = planner::generate_plan(&db, &config.user, start)?;
            println!("planned {} sessions from {start}", sessions.len());
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        PlanAction::Show { start } => {
            let start = start.unwrap_or_else(|| Local::now().date_naive());
            let sessions = db.week_sessions(&config.user, start)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
