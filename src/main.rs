use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
use config::{AppConfig, CliConfig, FileConfig};

mod library;
use library::LibraryManager;

mod library_store;
use library_store::SqliteLibraryStore;

mod server;
use server::{run_server, RequestsLoggingLevel, ServerConfig};

mod sqlite_persistence;

mod text;

mod user;
use user::{SqliteUserStore, UserManager};

mod wikipedia;
use wikipedia::{NoopImageResolver, SingerImageResolver, WikipediaClient};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the SQLite database files.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Disable Wikipedia image lookups for new singers.
    #[clap(long, default_value_t = false)]
    pub disable_wikipedia: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|err| anyhow::anyhow!("Error initializing logging: {}", err))?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
        disable_wikipedia: cli_args.disable_wikipedia,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;
    info!("Using database directory {:?}", config.db_dir);

    let user_store = Arc::new(SqliteUserStore::new(config.user_db_path())?);
    let user_manager = Arc::new(UserManager::new(user_store));

    let library_store = Arc::new(SqliteLibraryStore::new(config.library_db_path())?);
    let image_resolver: Arc<dyn SingerImageResolver> = if config.wikipedia.enabled {
        Arc::new(WikipediaClient::new(config.wikipedia.thumbnail_size))
    } else {
        info!("Wikipedia image lookups are disabled");
        Arc::new(NoopImageResolver)
    };
    let library_manager = Arc::new(LibraryManager::new(library_store, image_resolver));

    info!("Ready to serve at port {}!", config.port);
    let server_config = ServerConfig {
        port: config.port,
        requests_logging_level: config.logging_level,
        frontend_dir_path: config.frontend_dir_path,
    };
    run_server(server_config, library_manager, user_manager).await
}
