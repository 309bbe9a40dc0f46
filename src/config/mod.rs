//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `ORDER_SETTLEMENT` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use order_settlement::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod payment;
mod push;
mod server;
mod worker;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use push::PushConfig;
pub use server::{Environment, LogFormat, ServerConfig};
pub use worker::WorkerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL configuration; absent means in-memory storage
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Payment provider configuration
    pub payment: PaymentConfig,

    /// Push gateway configuration
    #[serde(default)]
    pub push: PushConfig,

    /// Background side-effect workers
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `ORDER_SETTLEMENT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ORDER_SETTLEMENT__PAYMENT__WEBHOOK_SECRET=whsec_...` -> `payment.webhook_secret`
    ///
    /// A `.env` file is read first when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ORDER_SETTLEMENT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    ///
    /// Production deployments must configure a webhook signing secret; the
    /// unsigned development mode is refused there.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.payment.validate()?;
        self.push.validate()?;
        self.worker.validate()?;
        if self.is_production() && !self.payment.verifies_webhooks() {
            return Err(ValidationError::WebhookSecretRequired);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "ORDER_SETTLEMENT__PAYMENT__SECRET_KEY",
        "ORDER_SETTLEMENT__PAYMENT__WEBHOOK_SECRET",
        "ORDER_SETTLEMENT__DATABASE__URL",
        "ORDER_SETTLEMENT__SERVER__PORT",
        "ORDER_SETTLEMENT__SERVER__ENVIRONMENT",
        "ORDER_SETTLEMENT__SERVER__PUBLIC_BASE_URL",
        "ORDER_SETTLEMENT__WORKER__WORKER_COUNT",
    ];

    fn set_minimal_env() {
        env::set_var("ORDER_SETTLEMENT__PAYMENT__SECRET_KEY", "sk_test_xxx");
        env::set_var("ORDER_SETTLEMENT__PAYMENT__WEBHOOK_SECRET", "whsec_xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert!(config.database.is_none());
        assert!(config.payment.verifies_webhooks());
        assert_eq!(config.worker.worker_count, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_section_is_picked_up() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var(
            "ORDER_SETTLEMENT__DATABASE__URL",
            "postgresql://orders@localhost/orders",
        );
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let database = config.database.expect("database section");
        assert_eq!(database.url, "postgresql://orders@localhost/orders");
        assert_eq!(database.max_connections, 10);
    }

    #[test]
    fn test_custom_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ORDER_SETTLEMENT__SERVER__PORT", "3000");
        env::set_var("ORDER_SETTLEMENT__WORKER__WORKER_COUNT", "8");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.worker.worker_count, 8);
    }

    #[test]
    fn test_production_requires_webhook_secret() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ORDER_SETTLEMENT__PAYMENT__SECRET_KEY", "sk_live_xxx");
        env::set_var("ORDER_SETTLEMENT__SERVER__ENVIRONMENT", "production");
        env::set_var(
            "ORDER_SETTLEMENT__SERVER__PUBLIC_BASE_URL",
            "https://shop.example.com",
        );
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::WebhookSecretRequired)
        );
    }

    #[test]
    fn test_missing_payment_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
