//! `pna-server`: the dashboard process
//!
//! - `serve` (default): load the corpus, connect the store, serve HTTP
//! - `wait-for-db`: block until PostgreSQL accepts connections
//! - `check`: validate the callback graph and print the evaluation order

use anyhow::Context;
use pna_dashboard::config::{action, cli, Action, DashboardConfig};
use pna_dashboard::{
    create_router, AppState, Dashboard, DashboardError, RouterOptions, Services, SessionStore,
};
use pna_data::{CorpusParts, DataFacade, PhilippinesEmbassyCorpus};
use pna_store::{wait_for_db, PgStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let config = DashboardConfig::from_matches(&matches)?;
    init_tracing(&config);

    match action(&matches) {
        Action::Serve => serve(config).await,
        Action::WaitForDb => {
            let interval = matches
                .subcommand_matches("wait-for-db")
                .and_then(|m| m.get_one::<u64>("interval-ms"))
                .copied()
                .unwrap_or(100);
            let settings = config.require_database()?;
            let attempts = wait_for_db(settings, Duration::from_millis(interval)).await;
            tracing::info!(attempts, "database ready");
            Ok(())
        }
        Action::Check => {
            let json = matches
                .subcommand_matches("check")
                .is_some_and(|m| m.get_flag("json"));
            check(json)
        }
    }
}

fn init_tracing(config: &DashboardConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_filter().into());

    if config.mode.is_development() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    }
}

/// Store for the run mode: PostgreSQL when configured (required in
/// production), otherwise in-memory
async fn services(
    config: &DashboardConfig,
    facade: Arc<dyn DataFacade>,
) -> anyhow::Result<Services> {
    match &config.database {
        Some(settings) => {
            let store = PgStore::new(settings.clone());
            store
                .init_schema()
                .await
                .context("creating narrative tables")?;
            tracing::info!(
                host = %settings.host,
                database = %settings.database,
                "using PostgreSQL store"
            );
            let store = Arc::new(store);
            Ok(Services {
                facade,
                narratives: store.clone(),
                labels: store,
            })
        }
        None if config.mode.is_development() => {
            tracing::warn!("no database configured, narratives are kept in memory");
            Ok(Services::in_memory(facade))
        }
        None => Err(DashboardError::Config(
            "PGSQL_HOST is required outside development mode".into(),
        )
        .into()),
    }
}

async fn serve(config: DashboardConfig) -> anyhow::Result<()> {
    let corpus = PhilippinesEmbassyCorpus::load(&config.data_dir)
        .with_context(|| format!("loading corpus from {}", config.data_dir.display()))?;
    let services = services(&config, Arc::new(corpus)).await?;
    let dashboard = Arc::new(Dashboard::build(&services)?);

    let options = RouterOptions {
        static_dir: config.static_dir.clone(),
        permissive_cors: config.mode.is_development(),
    };
    let sessions = SessionStore::with_limits(config.session_idle, config.max_sessions);
    let app = create_router(AppState::with_sessions(dashboard, sessions), &options);

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, mode = ?config.mode, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DashboardError::Server(e.to_string()))?;

    tracing::info!("dashboard shutting down");
    Ok(())
}

/// Build the graph against an empty corpus and report it
fn check(json: bool) -> anyhow::Result<()> {
    let corpus = PhilippinesEmbassyCorpus::from_parts(CorpusParts::default());
    let services = Services::in_memory(Arc::new(corpus));
    let dashboard = Dashboard::build(&services)?;
    let graph = dashboard.graph();

    if json {
        println!("{}", serde_json::to_string_pretty(&graph.descriptors())?);
    } else {
        println!("Callback graph: VALID");
        println!("  Components: {}", dashboard.layout().len());
        println!("  Callbacks: {}", graph.len());
        println!("  Trigger edges: {}", graph.edge_count());
        println!();
        println!("Evaluation order:");
        for (i, spec) in graph.in_order().enumerate() {
            let flag = if spec.skip_on_initial_load() { "" } else { " (initial load)" };
            println!("  {:>2}. {}{flag}", i + 1, spec.id());
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("received terminate signal, shutting down");
        }
    }
}
