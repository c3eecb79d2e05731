//! campaign-credits server binary.
//!
//! Loads configuration, connects to Postgres, applies migrations and
//! serves the API until Ctrl-C or SIGTERM.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use campaign_credits::adapters::auth::JwtSessionValidator;
use campaign_credits::adapters::http::{app_router, AppPorts, AppSettings, AppState};
use campaign_credits::adapters::postgres::{
    PostgresCampaignRepository, PostgresCreditLedger, PostgresProfileRepository,
    PostgresSubscriptionRepository, PostgresVisitRepository, PostgresWebhookEventRepository,
};
use campaign_credits::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use campaign_credits::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config.server);

    info!(
        environment = ?config.server.environment,
        debug_routes = config.features.debug_routes,
        "starting campaign-credits"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("applying database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let payment_provider = StripePaymentAdapter::new(StripeConfig::from(&config.payment))?;

    let ports = AppPorts {
        profiles: Arc::new(PostgresProfileRepository::new(pool.clone())),
        campaigns: Arc::new(PostgresCampaignRepository::new(pool.clone())),
        ledger: Arc::new(PostgresCreditLedger::new(pool.clone())),
        visits: Arc::new(PostgresVisitRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool.clone())),
        payment_provider: Arc::new(payment_provider),
        session_validator: Arc::new(JwtSessionValidator::new(&config.auth)),
    };
    let state = AppState::new(ports, AppSettings::from(&config));
    let app = app_router(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}

/// JSON logs in production, pretty output elsewhere. `RUST_LOG` wins over
/// `server.log_level`.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if server.is_production() {
        builder.json().with_current_span(true).init();
    } else {
        builder.pretty().init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
