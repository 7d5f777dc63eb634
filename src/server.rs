use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    auth,
    config::Config,
    handlers::{self, AppState},
    metrics,
    signals::setup_signal_handlers,
};

/// Request bodies are tiny JSON objects
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Start the estimate gateway
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Sets up signal handlers for graceful shutdown
/// 3. Builds the immutable application state from configuration
/// 4. Binds to the configured address
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let (shutdown_tx, signal_handle) = setup_signal_handlers()?;
    let mut shutdown_rx = shutdown_tx.subscribe();

    let state = AppState::from_config(&config, reqwest::Client::new())?;

    if !state.payments.is_live() {
        if config.payment.dev_bypass {
            warn!("No payment provider configured, development bypass is ENABLED");
        } else {
            warn!("No payment provider configured, purchases cannot be verified");
        }
    }

    let app = create_router(state, metrics_handle, &config.server.cors_allowed_origin)?;

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting estimate gateway on {}", addr);
    info!(
        payment_provider = if config.payment.access_token.is_some() { "gumroad" } else { "none" },
        metrics = config.metrics.enabled,
        "Configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    state: AppState,
    metrics_handle: Option<Arc<PrometheusHandle>>,
    cors_origin: &str,
) -> Result<Router> {
    // Paid-tier routes, gated by an entitlement credential
    let gated_routes = Router::new()
        .route(
            "/api/get-breakdown",
            post(handlers::breakdown::get_breakdown_handler)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/generate-pdf",
            post(handlers::report::get_report_data).fallback(handlers::method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::entitlement_middleware,
        ));

    let api_routes = Router::new()
        .route(
            "/api/verify-payment",
            post(handlers::verify_payment::verify_payment)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/estimate",
            post(handlers::estimate::estimate).fallback(handlers::method_not_allowed),
        )
        .merge(gated_routes)
        .with_state(state);

    let mut app = Router::new().route("/health", get(handlers::health::health_check));

    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route("/metrics", get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    Ok(app
        .merge(api_routes)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(cors_origin)?)
        .layer(TraceLayer::new_for_http()))
}

/// CORS for the browser client; also answers preflight requests
fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::exact(HeaderValue::from_str(origin)?)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]))
}
