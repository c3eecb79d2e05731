//! Application configuration module
//!
//! Configuration is layered with the `config` crate: built-in defaults,
//! optional `config/default.toml` and `config/{environment}.toml` files,
//! then environment variables with the `CAMPAIGN_CREDITS` prefix. Nested
//! values use a double underscore as separator. A `.env` file is read
//! through `dotenvy` when present.
//!
//! # Example
//!
//! ```no_run
//! use campaign_credits::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod auth;
mod credits;
mod database;
mod error;
mod features;
mod payment;
mod server;

pub use auth::AuthConfig;
pub use credits::CreditsConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "CAMPAIGN_CREDITS";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Bearer token validation
    pub auth: AuthConfig,

    /// Payment configuration (Stripe)
    pub payment: PaymentConfig,

    /// Credit bookkeeping knobs
    #[serde(default)]
    pub credits: CreditsConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `CAMPAIGN_CREDITS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CAMPAIGN_CREDITS__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required values are missing or cannot be
    /// parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = std::env::var(format!("{ENV_PREFIX}__SERVER__ENVIRONMENT"))
            .unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{environment}")).required(false))
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate(&self.server.environment)?;
        self.credits.validate()?;
        self.features.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
