//! Shared helpers for CLI commands.

use studyflow_core::{Config, PlannerDb};

/// Open the planner database, honoring a config-level path override.
pub fn open_db(config: &Config) -> Result<PlannerDb, Box<dyn std::error::Error>> {
    let db = match &config.database_path {
        Some(path) => PlannerDb::open_at(path)?,
        None => PlannerDb::open()?,
    };
    Ok(db)
}
