//! Axum server setup and router configuration.

use crate::api::receive_event;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Slack Events API
        .route("/events", post(receive_event))
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use notico_core::config::{ServerConfig, SharedConfig, SlackConfig};
    use notico_core::testing::RecordingSink;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use url::Url;

    fn state() -> AppState {
        let server = ServerConfig {
            listen: "127.0.0.1:0".parse().unwrap(),
            publish_timeout: Duration::from_secs(1),
        };
        let slack = SlackConfig {
            token: "xoxb-test".into(),
            signing_secret: None,
            notify_channel: "#admins".into(),
            team_domain: None,
            api_base: Url::parse("http://127.0.0.1:9/").unwrap(),
        };
        AppState::new(
            SharedConfig::new(server, slack),
            Arc::new(RecordingSink::new()),
        )
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = build_router(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_events_requires_post() {
        let response = build_router(state())
            .oneshot(Request::get("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
