//! Weekly availability commands.

use clap::Subcommand;
use studyflow_core::{Config, PlanStore, WeekAvailability};

use super::common;

#[derive(Subcommand)]
pub enum AvailabilityAction {
    /// Set study hours for the whole week at once, Sunday first
    Set {
        /// Hours on Sunday, 0-24
        sunday: f64,
        /// Hours on Monday, 0-24
        monday: f64,
        /// Hours on Tuesday, 0-24
        tuesday: f64,
        /// Hours on Wednesday, 0-24
        wednesday: f64,
        /// Hours on Thursday, 0-24
        thursday: f64,
        /// Hours on Friday, 0-24
        friday: f64,
        /// Hours on Saturday, 0-24
        saturday: f64,
    },
    /// Show the current weekly availability
    Show,
}

pub fn run(action: AvailabilityAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = common::open_db(&config)?;

    match action {
        AvailabilityAction::Set {
            sunday,
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
        } => {
            let availability = WeekAvailability::new([
                sunday, monday, tuesday, wednesday, thursday, friday, saturday,
            ])?;
            db.set_availability(&config.user, &availability)?;
            println!("availability updated");
        }
        AvailabilityAction::Show => {
            let availability = db.load_availability(&config.user)?;
            println!("{}", serde_json::to_string_pretty(&availability)?);
        }
    }
    Ok(())
}
