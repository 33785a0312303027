use anyhow::Context;
use gatekeeper::{
    cli::{Cli, Commands},
    db::{seed_identities, MemoryIdentityStore},
    utils::logging,
    AppState, GatekeeperConfig,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets referenced by the config usually come from .env in development
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let config = GatekeeperConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Some(Commands::Config { validate }) => {
            if !validate {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
        Some(Commands::Serve) | None => serve(config).await,
    }
}

async fn serve(config: GatekeeperConfig) -> anyhow::Result<()> {
    logging::init(&config.server);

    let key = config.signing_key()?;
    let seeds = config.seed_identities()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let store = Arc::new(MemoryIdentityStore::new());
    let state = AppState::build(config, &key, store.clone())?;
    seed_identities(store.as_ref(), &state.hasher, &seeds).await?;

    let app = gatekeeper::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "gatekeeper listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
