//! Store ratings CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sr-cli migrate
//!
//! # Bootstrap the first administrator
//! sr-cli user create -n "Platform Administrator" -e admin@example.com \
//!     -p 's3cret!' -a "1 Main St" -r admin
//!
//! # Load demo users, stores and ratings
//! sr-cli seed crates/cli/seed/demo.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sr-cli")]
#[command(author, version, about = "Store ratings CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Load users, stores and ratings from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(default_value = "crates/cli/seed/demo.yaml")]
        file: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user account of any role
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Postal address
        #[arg(short, long)]
        address: String,

        /// Role (`admin`, `user`, `owner`)
        #[arg(short, long, default_value = "user")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                name,
                email,
                password,
                address,
                role,
            } => {
                commands::user::create(commands::user::NewAccount {
                    name,
                    email,
                    password,
                    address,
                    role,
                })
                .await?;
            }
        },
        Commands::Seed { file } => commands::seed::run(&file).await?,
    }
    Ok(())
}
