use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyflow-cli", version, about = "Studyflow CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Course management
    Course {
        #[command(subcommand)]
        action: commands::course::CourseAction,
    },
    /// Deliverable management
    Deliverable {
        #[command(subcommand)]
        action: commands::deliverable::DeliverableAction,
    },
    /// Weekly availability
    Availability {
        #[command(subcommand)]
        action: commands::availability::AvailabilityAction,
    },
    /// Weekly study plan
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Session progress and replanning
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Grade projection and targets
    Grade {
        #[command(subcommand)]
        action: commands::grade::GradeAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Course { action } => commands::course::run(action),
        Commands::Deliverable { action } => commands::deliverable::run(action),
        Commands::Availability { action } => commands::availability::run(action),
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Grade { action } => commands::grade::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
