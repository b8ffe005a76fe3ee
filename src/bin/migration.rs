use anyhow::{Context, Result};
use backoffice_api::{db, migrator::Migrator};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

#[derive(Parser)]
#[command(name = "migration", about = "Manage the backoffice database schema")]
struct Cli {
    /// Database URL; falls back to DATABASE_URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://backoffice.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply all pending migrations (default)
    Up,
    /// Roll back the last `steps` migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and re-apply all migrations
    Fresh,
    /// Print applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    info!("Connecting to database: {}", cli.database_url);

    let pool = db::establish_connection_with_config(&db::DbConfig {
        url: cli.database_url.clone(),
        max_connections: 2,
        ..Default::default()
    })
    .await
    .context("failed to connect to database")?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => db::run_migrations(&pool)
            .await
            .context("failed to apply migrations")?,
        Command::Down { steps } => Migrator::down(&pool, Some(steps))
            .await
            .context("failed to roll back migrations")?,
        Command::Fresh => Migrator::fresh(&pool)
            .await
            .context("failed to rebuild schema")?,
        Command::Status => Migrator::status(&pool)
            .await
            .context("failed to read migration status")?,
    }

    info!("Migration command completed successfully");
    Ok(())
}
