//! Order Settlement server.
//!
//! Loads configuration, wires adapters to handlers, starts the side-effect
//! workers and serves the HTTP API until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use tokio::sync::watch;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{fmt, EnvFilter};

use order_settlement::adapters::http::router;
use order_settlement::adapters::push::{ExpoPushConfig, ExpoPushGateway};
use order_settlement::adapters::stripe::{StripeTransferAdapter, StripeTransferConfig};
use order_settlement::adapters::tasks::SideEffectWorkerPool;
use order_settlement::app::{connect_postgres, payout_settings, Ports, Services, StartupError};
use order_settlement::config::{AppConfig, LogFormat};
use order_settlement::domain::webhook::WebhookVerifier;
use order_settlement::ports::{PushGateway, TransferGateway};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

fn load_configuration() -> Result<AppConfig, StartupError> {
    let config = AppConfig::load()?;
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    match config.server.log_format {
        LogFormat::Json => fmt().json().with_env_filter(filter).with_target(true).init(),
        LogFormat::Pretty => fmt().pretty().with_env_filter(filter).with_target(true).init(),
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "Starting order settlement"
    );

    let transfers: Arc<dyn TransferGateway> = Arc::new(StripeTransferAdapter::new(
        StripeTransferConfig::from_payment_config(&config.payment),
    )?);
    let push: Arc<dyn PushGateway> = Arc::new(ExpoPushGateway::new(
        ExpoPushConfig::from_push_config(&config.push),
    )?);

    let ports = match &config.database {
        Some(database) => {
            tracing::info!("Connecting to database");
            let pool = connect_postgres(database).await?;
            Ports::postgres(pool, transfers, push)
        }
        None => {
            tracing::warn!("No database configured, using in-memory storage");
            Ports::in_memory(transfers, push)
        }
    };

    let verifier = WebhookVerifier::new(config.payment.webhook_secret.clone());
    if !verifier.is_enabled() {
        tracing::warn!("No webhook secret configured, signatures will not be verified");
    }

    let (queue, pool) = SideEffectWorkerPool::new(&config.worker);
    let services = Services::wire(
        ports,
        verifier,
        Arc::new(queue),
        payout_settings(&config.payment)?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let workers = pool.spawn(services.executor.clone(), shutdown_rx);

    let request_id = HeaderName::from_static("x-request-id");
    let app = router(services.state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        webhook_url = %config.server.callback_url("/payments/webhook"),
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Draining side-effect workers");
    let _ = shutdown_tx.send(true);
    for worker in workers {
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "Side-effect worker panicked");
        }
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
