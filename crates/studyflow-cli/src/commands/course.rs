//! Course management commands.

use clap::Subcommand;
use studyflow_core::Config;

use super::common;

#[derive(Subcommand)]
pub enum CourseAction {
    /// Add a course
    Add {
        /// Course name
        name: String,
        /// Short course code, e.g. CS-341
        #[arg(long)]
        code: Option<String>,
    },
    /// List courses
    List,
    /// Remove a course and everything attached to it
    Remove {
        /// Course ID
        id: String,
    },
}

pub fn run(action: CourseAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = common::open_db(&config)?;

    match action {
        CourseAction::Add { name, code } => {
            let course = db.create_course(&config.user, &name, code.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&course)?);
        }
        CourseAction::List => {
            let courses = db.list_courses(&config.user)?;
            println!("{}", serde_json::to_string_pretty(&courses)?);
        }
        CourseAction::Remove { id } => {
            db.delete_course(&id)?;
            println!("course removed");
        }
    }
    Ok(())
}
