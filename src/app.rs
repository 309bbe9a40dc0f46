//! Application wiring.
//!
//! Builds the handler graph from a set of ports. `main` fills the ports from
//! configuration; tests fill them with in-memory adapters and mocks.

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

use crate::adapters::http::AppState;
use crate::adapters::memory::{
    InMemoryNotificationHistory, InMemoryOrderRepository, InMemoryPayeeDirectory,
    InMemoryPreferenceRepository, InMemoryPromoCodeRepository, InMemoryPushTokenRepository,
};
use crate::adapters::postgres::{
    PostgresNotificationHistory, PostgresOrderRepository, PostgresPayeeDirectory,
    PostgresPreferenceRepository, PostgresPromoCodeRepository, PostgresPushTokenRepository,
};
use crate::adapters::tasks::SideEffectExecutor;
use crate::application::handlers::{
    DisablePushTokenHandler, DispatchNotificationHandler, GetOrderHandler, GetPreferencesHandler,
    HandlePaymentWebhookHandler, ListNotificationsHandler, MarkNotificationReadHandler,
    MaterializeOrderHandler, PayoutSettings, ReconcilePayoutHandler, RegisterPushTokenHandler,
    TransferPayoutHandler, UpdateOrderStatusHandler, UpdatePreferencesHandler,
};
use crate::config::{DatabaseConfig, PaymentConfig};
use crate::domain::payout::FeeRate;
use crate::domain::webhook::WebhookVerifier;
use crate::ports::{
    GatewayError, NotificationHistoryRepository, OrderRepository, PayeeDirectory,
    PreferenceRepository, PromoCodeRepository, PushGateway, PushTokenRepository,
    SideEffectQueue, TransferGateway,
};

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ValidationError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Gateway client setup failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Every port the handlers depend on.
#[derive(Clone)]
pub struct Ports {
    pub orders: Arc<dyn OrderRepository>,
    pub promo_codes: Arc<dyn PromoCodeRepository>,
    pub payees: Arc<dyn PayeeDirectory>,
    pub push_tokens: Arc<dyn PushTokenRepository>,
    pub preferences: Arc<dyn PreferenceRepository>,
    pub history: Arc<dyn NotificationHistoryRepository>,
    pub transfers: Arc<dyn TransferGateway>,
    pub push: Arc<dyn PushGateway>,
}

impl Ports {
    /// Process-local storage. Data is lost on restart.
    pub fn in_memory(transfers: Arc<dyn TransferGateway>, push: Arc<dyn PushGateway>) -> Self {
        Self {
            orders: Arc::new(InMemoryOrderRepository::new()),
            promo_codes: Arc::new(InMemoryPromoCodeRepository::new()),
            payees: Arc::new(InMemoryPayeeDirectory::new()),
            push_tokens: Arc::new(InMemoryPushTokenRepository::new()),
            preferences: Arc::new(InMemoryPreferenceRepository::new()),
            history: Arc::new(InMemoryNotificationHistory::new()),
            transfers,
            push,
        }
    }

    pub fn postgres(
        pool: PgPool,
        transfers: Arc<dyn TransferGateway>,
        push: Arc<dyn PushGateway>,
    ) -> Self {
        Self {
            orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
            promo_codes: Arc::new(PostgresPromoCodeRepository::new(pool.clone())),
            payees: Arc::new(PostgresPayeeDirectory::new(pool.clone())),
            push_tokens: Arc::new(PostgresPushTokenRepository::new(pool.clone())),
            preferences: Arc::new(PostgresPreferenceRepository::new(pool.clone())),
            history: Arc::new(PostgresNotificationHistory::new(pool)),
            transfers,
            push,
        }
    }
}

/// The wired handler graph.
pub struct Services {
    /// Request-path handlers for the router.
    pub state: AppState,
    /// Background handlers for the side-effect workers.
    pub executor: Arc<SideEffectExecutor>,
}

impl Services {
    pub fn wire(
        ports: Ports,
        verifier: WebhookVerifier,
        queue: Arc<dyn SideEffectQueue>,
        payout_settings: PayoutSettings,
    ) -> Self {
        let materialize = Arc::new(MaterializeOrderHandler::new(
            ports.orders.clone(),
            ports.promo_codes.clone(),
        ));
        let transfer = Arc::new(TransferPayoutHandler::new(
            ports.orders.clone(),
            ports.payees.clone(),
            ports.transfers.clone(),
            payout_settings,
        ));
        let dispatch = Arc::new(DispatchNotificationHandler::new(
            ports.push_tokens.clone(),
            ports.preferences.clone(),
            ports.history.clone(),
            ports.push.clone(),
        ));

        let state = AppState {
            webhook: Arc::new(HandlePaymentWebhookHandler::new(
                verifier,
                materialize,
                queue.clone(),
            )),
            get_order: Arc::new(GetOrderHandler::new(ports.orders.clone())),
            update_order_status: Arc::new(UpdateOrderStatusHandler::new(
                ports.orders.clone(),
                queue,
            )),
            reconcile_payout: Arc::new(ReconcilePayoutHandler::new(
                ports.orders.clone(),
                transfer.clone(),
            )),
            register_push_token: Arc::new(RegisterPushTokenHandler::new(
                ports.push_tokens.clone(),
            )),
            disable_push_token: Arc::new(DisablePushTokenHandler::new(ports.push_tokens)),
            get_preferences: Arc::new(GetPreferencesHandler::new(ports.preferences.clone())),
            update_preferences: Arc::new(UpdatePreferencesHandler::new(ports.preferences)),
            list_notifications: Arc::new(ListNotificationsHandler::new(ports.history.clone())),
            mark_notification_read: Arc::new(MarkNotificationReadHandler::new(ports.history)),
        };

        Self {
            state,
            executor: Arc::new(SideEffectExecutor::new(transfer, dispatch)),
        }
    }
}

/// Payout settings from the payment section.
pub fn payout_settings(config: &PaymentConfig) -> Result<PayoutSettings, StartupError> {
    let default_fee = FeeRate::from_bps(config.platform_fee_bps)
        .map_err(|_| crate::config::ValidationError::InvalidPlatformFee)?;
    Ok(PayoutSettings {
        default_fee,
        currency: config.currency.clone(),
        // Claims outlive one provider call before another attempt may take over
        stale_after: config.request_timeout() * 2,
    })
}

/// Opens the pool and applies pending migrations when enabled.
pub async fn connect_postgres(config: &DatabaseConfig) -> Result<PgPool, StartupError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await?;

    if config.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }
    Ok(pool)
}
