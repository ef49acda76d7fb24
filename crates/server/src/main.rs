//! Call Agent Server Entry Point

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use call_agent_config::{load_settings, FlowScript, Settings};
use call_agent_flow::CallFlow;
use call_agent_server::{create_router, init_metrics, AppState};
use call_agent_telephony::TwilioGateway;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env} > config/default > defaults
    let env = std::env::var("CALL_AGENT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting Call Agent Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        organization = %config.organization,
        variant = ?config.flow.variant,
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        let handle = init_metrics();
        if handle.is_some() {
            tracing::info!("Initialized Prometheus metrics at /metrics");
        }
        handle
    } else {
        None
    };

    let upstream_timeout = Duration::from_secs(config.flow.upstream_timeout_secs);

    let translator = call_agent_text_processing::create_translator(&config.translation);
    let answers = call_agent_llm::create_answer_engine(&config).await?;
    tracing::info!(
        translator = translator.name(),
        answer_engine = answers.name(),
        "Initialized language services"
    );

    let persistence = call_agent_persistence::init(&config).await;
    let script = FlowScript::load_or_default(config.flow.script_path.as_deref())?;

    let mut flow = CallFlow::new(
        translator,
        answers,
        persistence.recorder.clone(),
        script,
        config.flow.clone(),
        config.organization.clone(),
    );
    if let Some(logger) = persistence.conversation_log {
        flow = flow.with_conversation_log(logger);
    }

    let gateway = Arc::new(TwilioGateway::new(&config.telephony, upstream_timeout)?);

    if config.server.public_url.is_empty() {
        tracing::warn!("server.public_url is not set; /make-call will fail until it is configured");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, flow, gateway).with_metrics(metrics_handle);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("call_agent={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
