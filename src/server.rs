//! HTTP surface: converts real requests into [`WebhookRequest`]s and back.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use log::{error, info};
use serde_json::{Value, json};

use crate::error::Result;
use crate::router::{RequestRouter, WebhookRequest, WebhookResponse};

/// Builds the axum application around a shared router.
pub fn app(router: Arc<RequestRouter>) -> Router {
    Router::new()
        .route("/", any(webhook))
        .route("/webhook", any(webhook))
        .route("/health", get(health))
        .with_state(router)
}

/// Serves the webhook until Ctrl+C.
pub async fn serve(router: RequestRouter, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Webhook listening on {}", listener.local_addr()?);

    axum::serve(listener, app(Arc::new(router)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, shutting down...");
}

async fn webhook(
    State(router): State<Arc<RequestRouter>>,
    method: Method,
    body: Bytes,
) -> Response {
    let request = WebhookRequest {
        method: method.to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    into_http(router.handle(request).await)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

fn into_http(envelope: WebhookResponse) -> Response {
    let mut builder = axum::http::Response::builder().status(envelope.status_code);
    for (name, value) in &envelope.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder.body(Body::from(envelope.body)).unwrap_or_else(|e| {
        error!("Failed to build HTTP response: {e}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_support::{RecordingTransport, StubSearch, spawn_stub};

    async fn spawn_app(transport: Arc<RecordingTransport>) -> String {
        let router = RequestRouter::new(
            Config::for_tests(Some("123:abc"), None),
            transport,
            Arc::new(StubSearch::returning("")),
            None,
        );
        spawn_stub(app(Arc::new(router)))
            .await
            .as_str()
            .trim_end_matches('/')
            .to_string()
    }

    #[tokio::test]
    async fn webhook_post_is_acknowledged_over_http() -> std::result::Result<(), reqwest::Error> {
        let transport = Arc::new(RecordingTransport::default());
        let base = spawn_app(transport.clone()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/webhook"))
            .header("Content-Type", "application/json")
            .body(r#"{"message":{"chat":{"id":5},"text":"/about"}}"#)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap_or_default(),
            "application/json"
        );
        assert_eq!(response.text().await?, r#"{"ok":true}"#);
        assert_eq!(transport.sent.take()[0].chat_id, 5);
        Ok(())
    }

    #[tokio::test]
    async fn preflight_and_wrong_methods_over_http() -> std::result::Result<(), reqwest::Error> {
        let base = spawn_app(Arc::new(RecordingTransport::default())).await;
        let client = reqwest::Client::new();

        let preflight = client
            .request(Method::OPTIONS, format!("{base}/"))
            .send()
            .await?;
        assert_eq!(preflight.status(), StatusCode::OK);
        assert_eq!(preflight.headers()["access-control-max-age"], "86400");
        assert!(preflight.text().await?.is_empty());

        let get = client.get(format!("{base}/webhook")).send().await?;
        assert_eq!(get.status(), StatusCode::METHOD_NOT_ALLOWED);
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_ok() -> std::result::Result<(), reqwest::Error> {
        let base = spawn_app(Arc::new(RecordingTransport::default())).await;

        let body: Value = reqwest::get(format!("{base}/health")).await?.json().await?;

        assert_eq!(body["status"], "ok");
        Ok(())
    }
}
