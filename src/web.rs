use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

pub fn app(config: &ServerConfig, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new().nest("/api", api::router(state)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            // Cors needs a `Default` response body, so it must sit inside the body limit
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(cors)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.request_timeout(),
            )),
    )
}

pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let app = app(config, state);

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&config.tls_cert_path, &config.tls_key_path) {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
            .await
            .with_context(|| format!("Failed to load TLS certificate {cert}"))?;
        let handle = axum_server::Handle::new();
        tokio::spawn(graceful_shutdown(handle.clone()));

        tracing::info!("Web server running at https://{}", addr);
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTPS server error")?;
        return Ok(());
    }

    #[cfg(not(feature = "tls"))]
    if config.tls_cert_path.is_some() {
        tracing::warn!("TLS configured but the binary was built without the `tls` feature");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(feature = "tls")]
async fn graceful_shutdown(handle: axum_server::Handle) {
    shutdown_signal().await;
    handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{MatchMode, QueryMatcher};
    use crate::pipeline::ChatPipeline;
    use crate::stations::StationRegistry;
    use crate::translation::PassthroughTranslator;
    use axum::body::Body;
    use axum::http::{Request, header};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        let registry = Arc::new(StationRegistry::builtin().unwrap());
        AppState {
            pipeline: Arc::new(ChatPipeline::new(
                Arc::new(PassthroughTranslator::new()),
                QueryMatcher::new(registry, MatchMode::Substring),
            )),
        }
    }

    #[tokio::test]
    async fn test_routes_nested_under_api() {
        let response = app(&ServerConfig::default(), state())
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let config = ServerConfig {
            max_body_bytes: 64,
            ..ServerConfig::default()
        };
        let body = format!(r#"{{"userQuery": "{}"}}"#, "a".repeat(256));
        let response = app(&config, state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/query")
                    .header(header::ORIGIN, "https://dashboard.example")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cross_origin_query_allowed() {
        let response = app(&ServerConfig::default(), state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/query")
                    .header(header::ORIGIN, "https://dashboard.example")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"userQuery": "water level at Delhi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
