//! Configuration management commands.

use clap::Subcommand;
use studyflow_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set the active user id
    SetUser {
        /// User id commands are scoped to
        user: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::SetUser { user } => {
            let mut config = Config::load_or_default();
            config.user = user;
            config.save()?;
            println!("user updated");
        }
    }
    Ok(())
}
