// src/main.rs
//! Identity service entry point.
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vira_identity::api::build_router;
use vira_identity::auth::core::PasswordService;
use vira_identity::auth::{bootstrap, AuthConfig, AuthService, IdentityStore};

#[derive(Parser)]
#[command(name = "vira-identity")]
#[command(about = "Identity and access service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Database URL, overriding DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind, overriding BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
    /// Delete expired refresh sessions, then exit
    CleanupSessions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging()?;

    info!("Starting vira-identity v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AuthConfig::from_env()?;
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    let store = Arc::new(IdentityStore::new(&config.database_url).await?);

    let passwords = PasswordService::new(config.bcrypt_cost);
    bootstrap::run(&store, &config, &passwords).await?;

    let service = Arc::new(AuthService::new(Arc::clone(&store), &config)?);

    match args.command {
        Some(Commands::CleanupSessions) => {
            let removed = service.cleanup_expired_sessions().await?;
            info!("Session cleanup finished, {} removed", removed);
        }
        Some(Commands::Serve { bind }) => {
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            serve(service, &addr).await?;
        }
        None => {
            serve(service, &config.bind_addr).await?;
        }
    }

    Ok(())
}

async fn serve(service: Arc<AuthService>, addr: &str) -> Result<()> {
    let app = build_router(service);
    tracing::info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=info,h2=info"));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
