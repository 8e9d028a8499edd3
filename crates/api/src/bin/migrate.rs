//! `qualityhub-migrate`: apply, revert, and inspect schema migrations.

use std::collections::HashSet;

use anyhow::Context;
use clap::{Parser, Subcommand};

use qualityhub_api::telemetry;
use qualityhub_db::migrations;

#[derive(Parser, Debug)]
#[command(name = "qualityhub-migrate")]
#[command(version, about = "Manage the QualityHub database schema", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply all pending migrations
    Up,

    /// Revert migrations (the most recent one unless --to is given)
    Down {
        /// Revert every migration newer than this version (0 reverts all)
        #[arg(long)]
        to: Option<i64>,
    },

    /// Show available migrations and whether each one is applied
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init(telemetry::format_from_env());

    let cli = Cli::parse();
    let pool = qualityhub_db::create_pool(&cli.database_url, 1)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Command::Up => {
            migrations::run_migrations(&pool)
                .await
                .context("Failed to apply migrations")?;
            let applied = migrations::applied_migrations(&pool).await?;
            println!("Schema is up to date ({} migrations applied)", applied.len());
        }
        Command::Down { to: Some(target) } => {
            migrations::revert_to(&pool, target)
                .await
                .with_context(|| format!("Failed to revert to version {target}"))?;
            println!("Reverted to version {target}");
        }
        Command::Down { to: None } => {
            match migrations::revert_last(&pool)
                .await
                .context("Failed to revert the last migration")?
            {
                Some(version) => println!("Reverted {version}"),
                None => println!("Nothing to revert"),
            }
        }
        Command::Status => {
            let applied: HashSet<i64> = migrations::applied_migrations(&pool)
                .await?
                .into_iter()
                .filter(|m| m.success)
                .map(|m| m.version)
                .collect();
            for migration in migrations::available_migrations() {
                let state = if applied.contains(&migration.version) {
                    "applied"
                } else {
                    "pending"
                };
                println!("{:<16} {:<8} {}", migration.version, state, migration.description);
            }
        }
    }

    pool.close().await;
    Ok(())
}
