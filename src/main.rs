use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use axum::middleware;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metro_commute::{
    config::Config,
    db,
    middleware::rate_limit::{create_global_governor, log_request},
    routes,
    services::{DbStore, HostedAuth, Services},
    AppResult, AppState,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metro_commute=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AppResult<()> {
    let config = Config::from_env()?;
    tracing::info!("Starting server at {}", config.server_addr());

    let db = db::connect(&config).await?;
    tracing::info!("Connected to database");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations complete");

    let services = Services {
        auth: Arc::new(HostedAuth::new(&config)),
        store: Arc::new(DbStore::new(db)),
        payment_delay: config.payment_delay,
        tracking_poll_interval: config.tracking_poll_interval,
    };
    let state = AppState::new(services, config.clone());
    state.spawn_session_sweeper();

    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(create_global_governor()?);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|_| metro_commute::AppError::Config(format!("Invalid address {}", config.server_addr())))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| metro_commute::AppError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| metro_commute::AppError::Internal(format!("Server error: {}", e)))
}
