use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dm_api::{create_app, AppState};
use dm_core::services::verification::{VerificationService, VerificationServiceConfig};
use dm_infra::sms::{create_sms_service, DynSmsServiceAdapter};
use dm_shared::config::{AppConfig, LogFormat, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_logging(&config.logging)?;

    let bind_address = config.server.bind_address();
    info!(
        environment = %config.environment,
        bind = %bind_address,
        "Starting DealMarket verification API"
    );

    let infra = dm_infra::load_config().context("Invalid infrastructure configuration")?;
    let provider = create_sms_service(&infra.sms).context("Failed to initialize SMS provider")?;
    info!(provider = provider.provider_name(), "SMS provider ready");

    let verification_service = Arc::new(VerificationService::new(
        Arc::new(DynSmsServiceAdapter::from_boxed(provider)),
        VerificationServiceConfig::from(&config.verification),
    ));
    let sweeper = verification_service.start_sweeper();

    let state = web::Data::new(AppState::new(verification_service));

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await;

    sweeper.shutdown().await;
    info!("DealMarket verification API stopped");

    result.context("Server error")
}

/// Initialize structured logging with tracing
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
    };

    result.context("Failed to install tracing subscriber")
}
