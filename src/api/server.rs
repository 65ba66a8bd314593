use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{gen_id, healthz, metrics_exposition, ping, version, AppState};
use crate::config::Config;
use crate::notify::{Escalator, Notifier, Transport};
use crate::watchdog::{CheckinCoordinator, TimerRegistry};

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping/:key", post(ping))
        .route("/healthz", get(healthz))
        .route("/id", get(gen_id))
        .route("/version", get(version))
        .route("/metrics", get(metrics_exposition))
        // Middleware
        .layer(TraceLayer::new_for_http())
        // A panic in a handler becomes a 500, never a crash
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// Wire registry, dispatcher and coordinator together from the configuration.
pub fn build_state(config: &Config) -> Result<Arc<AppState>, Box<dyn std::error::Error>> {
    let transport = Transport::from_config(config)?;
    tracing::info!(transport = transport.name(), "Escalation transport selected");

    let notifier = Arc::new(Notifier::new(
        transport,
        config.environment.clone(),
        Duration::from_secs(config.notify_timeout),
    ));
    let registry = Arc::new(TimerRegistry::new(Arc::new(Escalator::new(notifier))));
    let coordinator = CheckinCoordinator::new(registry, Duration::from_secs(config.interval));

    Ok(Arc::new(AppState { coordinator }))
}

/// Run the HTTP server
pub async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(&config)?;
    let registry = Arc::clone(state.coordinator.registry());

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting vigil watchdog on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(registry))
        .await?;

    tracing::info!("Vigil watchdog stopped");
    Ok(())
}

async fn shutdown_signal(registry: Arc<TimerRegistry>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received, stopping timers...");
    registry.stop_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, Arc<AppState>) {
        let state = build_state(&Config::default()).unwrap();
        (build_router(Arc::clone(&state)), state)
    }

    fn ping_request(key: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/ping/{key}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ping_arms_timer() {
        let (app, state) = create_test_app();

        let body = serde_json::json!({
            "status": "firing",
            "commonAnnotations": {"message": "svc down"}
        });
        let response = app
            .oneshot(ping_request("abc", &body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.coordinator.registry().count(), 1);
    }

    #[tokio::test]
    async fn test_ping_rejects_malformed_body() {
        let (app, state) = create_test_app();

        let response = app
            .oneshot(ping_request("abc", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.coordinator.registry().count(), 0);
    }

    #[tokio::test]
    async fn test_ping_rejects_bad_key() {
        let (app, state) = create_test_app();

        let response = app
            .oneshot(ping_request("bad%20key", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.coordinator.registry().count(), 0);
    }

    #[tokio::test]
    async fn test_ping_wrong_method() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ping/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_gen_id() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/id").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["timerid"].as_str().map(|s| !s.is_empty()).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_version() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/version")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(bytes, env!("CARGO_PKG_VERSION").as_bytes());
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let (app, _) = create_test_app();

        // make sure at least one metric family exists
        crate::metrics::CHECKINS_RECEIVED.inc();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("vigil_checkins_received_total"));
    }
}
