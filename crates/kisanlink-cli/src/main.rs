mod market;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kisanlink-cli")]
#[command(about = "KisanLink marketplace command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database administration
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Inspect the named location table
    Locations {
        #[command(subcommand)]
        command: LocationsCommands,
    },
    /// Rank farmers by distance from a point, nearest first
    Rank {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Drop farmers farther than this, and farmers that cannot be located
        #[arg(long)]
        max_distance_km: Option<f64>,
    },
    /// Recommend items for a consumer
    Recommend {
        #[arg(long)]
        consumer: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
    /// Upsert demo farmers, items, and consumers
    Seed {
        /// YAML location table used to place the demo accounts
        #[arg(long, env = "KISANLINK_LOCATIONS_PATH")]
        locations: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum LocationsCommands {
    List {
        /// YAML override; the built-in table is used when unset
        #[arg(long, env = "KISANLINK_LOCATIONS_PATH")]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        None => Cli::command().print_help()?,
        Some(Commands::Locations {
            command: LocationsCommands::List { path },
        }) => market::run_locations_list(path.as_deref())?,
        Some(Commands::Db { command }) => {
            // DATABASE_URL is all the db commands need.
            let pool = kisanlink_db::connect_pool_from_env().await?;
            run_db(command, &pool).await?;
        }
        Some(Commands::Rank {
            lat,
            lon,
            max_distance_km,
        }) => {
            let (config, pool) = connect().await?;
            market::run_rank(&pool, &config, lat, lon, max_distance_km).await?;
        }
        Some(Commands::Recommend { consumer }) => {
            let (config, pool) = connect().await?;
            market::run_recommend(&pool, &config, consumer).await?;
        }
    }

    Ok(())
}

async fn connect() -> anyhow::Result<(kisanlink_core::AppConfig, sqlx::PgPool)> {
    let config = kisanlink_core::load_app_config()?;
    let pool_config = kisanlink_db::PoolConfig::from_app_config(&config);
    let pool = kisanlink_db::connect_pool(&config.database_url, pool_config).await?;
    Ok((config, pool))
}

async fn run_db(command: DbCommands, pool: &sqlx::PgPool) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            kisanlink_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = kisanlink_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed { locations } => {
            let locations = market::location_table(locations.as_deref())?;
            let summary = kisanlink_db::seed_demo_marketplace(pool, &locations).await?;
            println!(
                "seeded {} farmers, {} items, {} consumers",
                summary.farmers, summary.items, summary.consumers
            );
        }
    }
    Ok(())
}
