mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use dolist_core::notifications::{self, LogTransport, Notifier};
use dolist_core::users;
use dolist_db::Database;
use dolist_types::api::NewUser;
use dolist_types::pagination::Page;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "dolist", about = "Administer a dolist database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database file if needed and apply pending migrations
    Migrate,

    /// Register a new user
    CreateUser {
        username: String,
        email: String,
        password: String,
    },

    /// Print a user's notification feed, newest first
    Feed {
        username: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Mail a password reset token to a user
    ResetPassword { username: String },
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dolist=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let db = Database::open(&config.db_path)?;
    let notifier = Notifier::new(Arc::new(LogTransport::new(config.mail_from.clone())));

    match cli.command {
        Command::Migrate => {
            info!("Database at {} is up to date", config.db_path.display());
        }
        Command::CreateUser {
            username,
            email,
            password,
        } => {
            let user = db.with_conn(|conn| {
                users::create(
                    conn,
                    NewUser {
                        username,
                        email,
                        password,
                    },
                )
            })?;
            println!("Created user {} ({})", user.username, user.id);
        }
        Command::Feed { username, page } => {
            let feed = db.with_conn(|conn| {
                let user = users::get_by_username(conn, &username)?;
                notifications::read_all(conn, &user, Page::new(page, config.page_size))
            })?;

            println!(
                "{} notifications for {} (page {})",
                feed.total, username, feed.page.number
            );
            for n in &feed.items {
                println!("{}  {:<32} {}", n.created.to_rfc3339(), n.name, n.notification);
            }
        }
        Command::ResetPassword { username } => {
            db.with_conn(|conn| users::request_password_reset(conn, &notifier, &username))?;
            println!("Reset token sent to {}", username);
        }
    }

    Ok(())
}
