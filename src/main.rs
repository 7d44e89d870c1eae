use std::{fs::File, io, time::Duration};

use clap::Parser;
use inkwell::{config::Settings, models::pagecache::DEFAULT_TTL};
use migration::{Migrator, MigratorTrait};
use rocket::Config;
use sea_orm::Database;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "inkwell.db")]
    /// Database path
    sqlite: String,

    #[arg(long)]
    /// Run migrations and exit
    migrate_only: bool,

    #[arg(long, env = "INKWELL_MEDIA_ROOT", default_value = "media")]
    /// Directory for uploaded images
    media_root: String,

    #[arg(long, env = "INKWELL_CACHE_TTL", default_value_t = DEFAULT_TTL.as_secs())]
    /// Seconds the home page is served from cache
    cache_ttl: u64,
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    let file = File::options()
        .write(true)
        .create_new(true)
        .open(&args.sqlite);
    match file {
        Ok(_) => tracing::info!(path = %args.sqlite, "created database file"),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => {
            tracing::error!(path = %args.sqlite, error = %e, "failed to open database file");
            return Err(e.into());
        }
    }

    let db = Database::connect(format!("sqlite://{}", args.sqlite)).await?;
    Migrator::up(&db, None).await?;

    if args.migrate_only {
        tracing::info!("migrations applied");
        return Ok(());
    }

    let figment = Config::figment()
        .merge(("keep_alive", 0))
        .merge(("ident", false));
    let settings = Settings::new(args.media_root, Duration::from_secs(args.cache_ttl));

    let _ = inkwell::build(figment, db, settings).launch().await?;

    Ok(())
}
