//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid public base URL")]
    InvalidPublicBaseUrl,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool max_connections must be at least 1")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid payment provider secret key format")]
    InvalidSecretKey,

    #[error("Invalid webhook signing secret format")]
    InvalidWebhookSecret,

    #[error("Platform fee must be between 0 and 10000 basis points")]
    InvalidPlatformFee,

    #[error("Invalid currency code")]
    InvalidCurrency,

    #[error("Invalid push gateway URL")]
    InvalidPushGatewayUrl,

    #[error("Outbound request timeout must be between 1 and 60 seconds")]
    InvalidOutboundTimeout,

    #[error("Worker queue capacity and worker count must be non-zero")]
    InvalidWorkerPool,

    #[error("Webhook signing secret is required in production")]
    WebhookSecretRequired,
}
