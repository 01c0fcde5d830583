//! Creates a staff login, or promotes an existing one and resets its password.

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use venue_server::auth::PasswordService;
use venue_server::config::Config;
use venue_server::models::{User, UserRole};
use venue_server::utils::validation::{normalize_email, validate_password};

#[derive(Parser)]
#[command(name = "create_staff")]
#[command(about = "Create or promote a staff account")]
struct Cli {
    /// Login email
    #[arg(long)]
    email: String,

    /// Password for the account (min 6 characters)
    #[arg(long)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let email = normalize_email(&cli.email);
    validate_password(&cli.password)?;

    let database_url = Config::database_url_from_env();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let hash = PasswordService::hash_password(&cli.password)?;
    let user = match User::find_by_email(&email, &pool).await? {
        Some(existing) => {
            User::set_password(existing.id, &hash, &pool).await?;
            let promoted = User::set_role(existing.id, UserRole::Staff, &pool).await?;
            tracing::info!(user_id = %promoted.id, previous_role = existing.role.as_str(), "Existing account promoted to staff");
            promoted
        }
        None => {
            let created = User::create(&email, &hash, UserRole::Staff, &pool).await?;
            tracing::info!(user_id = %created.id, "Staff account created");
            created
        }
    };

    println!("Staff account ready: {} ({})", user.email, user.id);
    Ok(())
}
