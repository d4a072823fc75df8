//! CS console CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cs-cli migrate
//!
//! # Create a staff user
//! cs-cli user create -u siti -p 'long-password' -r operator
//!
//! # Reset a staff user's password
//! cs-cli user set-password -u siti -p 'new-long-password'
//!
//! # Store yesterday's dashboard metrics
//! cs-cli metrics store-daily --date 2024-04-01
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` / `user set-password` - Manage staff users
//! - `metrics store-daily` - Aggregate one day into `daily_metrics`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(author, version, about = "CS console CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Dashboard metrics jobs
    Metrics {
        #[command(subcommand)]
        action: MetricsAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new staff user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Initial password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Staff role (`admin`, `operator`)
        #[arg(short, long, default_value = "operator")]
        role: String,
    },
    /// Replace a staff user's password
    SetPassword {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// New password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum MetricsAction {
    /// Compute one day's metrics and upsert them into `daily_metrics`
    StoreDaily {
        /// Day to store (YYYY-MM-DD); defaults to today in the business timezone
        #[arg(short, long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                password,
                role,
            } => {
                commands::user::create(&username, &password, &role).await?;
            }
            UserAction::SetPassword { username, password } => {
                commands::user::set_password(&username, &password).await?;
            }
        },
        Commands::Metrics { action } => match action {
            MetricsAction::StoreDaily { date } => {
                commands::metrics::store_daily(date.as_deref()).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_user_create() {
        let cli = Cli::try_parse_from([
            "cs-cli", "user", "create", "-u", "siti", "-p", "rahasia-panjang", "-r", "admin",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::Create { ref role, .. }
            }) if role == "admin"
        ));
    }

    #[test]
    fn test_store_daily_date_is_optional() {
        let cli = Cli::try_parse_from(["cs-cli", "metrics", "store-daily"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Metrics {
                action: MetricsAction::StoreDaily { date: None }
            })
        ));
    }
}
