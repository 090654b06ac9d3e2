//! Bozor CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bozor-cli migrate
//!
//! # Create a user that can sign in
//! bozor-cli user create --login admin --password '...' \
//!     --first-name Admin --last-name Bozor --role 1
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create users

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use bozor_core::RoleId;

mod commands;

#[derive(Parser)]
#[command(name = "bozor-cli")]
#[command(author, version, about = "Bozor CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Sign-in login
        #[arg(short, long)]
        login: String,

        /// Plain-text password (hashed before it is stored)
        #[arg(short, long)]
        password: String,

        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Phone number
        #[arg(long, default_value = "")]
        phone_number: String,

        /// Role ID (1 = admin)
        #[arg(short, long, default_value_t = 1)]
        role: i64,
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
                login,
                password,
                first_name,
                last_name,
                phone_number,
                role,
            } => {
                commands::user::create(&commands::user::NewUser {
                    login: &login,
                    password: &password,
                    first_name: &first_name,
                    last_name: &last_name,
                    phone_number: &phone_number,
                    role: RoleId::new(role),
                })
                .await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "bozor-cli",
            "user",
            "create",
            "--login",
            "admin",
            "--password",
            "long-enough-secret",
            "--first-name",
            "Admin",
            "--last-name",
            "Bozor",
        ])
        .unwrap();

        match cli.command {
            Commands::User {
                action: UserAction::Create { login, role, .. },
            } => {
                assert_eq!(login, "admin");
                assert_eq!(role, 1);
            }
            Commands::Migrate => panic!("expected user create"),
        }
    }
}
