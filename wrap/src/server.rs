//! HTTP transport with graceful shutdown
//!
//! The server has no route table. Every request lands in one fallback that
//! builds a [`Request`] from method, URI, query string and body, wraps it in
//! a [`Ctx`] with an [`HttpResponder`], and lets the application handler walk
//! the path itself.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Router,
};
use http::{HeaderMap, Method, StatusCode, Uri};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    action::Action,
    config::Config,
    context::Ctx,
    diagnostics::{DiagnosticSink, TracingSink},
    error::Result,
    handler::Handler,
    middleware::{request_id_layer, request_id_propagation_layer, sensitive_headers_layer},
    path::Path,
    request::Request,
    responder::{HttpResponder, Responder},
};

/// Server instance
pub struct Server {
    config: Config,
    sink: Arc<dyn DiagnosticSink>,
}

/// State shared by every request
struct Shared<H> {
    handler: Arc<H>,
    config: Arc<Config>,
    sink: Arc<dyn DiagnosticSink>,
}

impl<H> Clone for Shared<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the sink that receives error diagnostics
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the router that sends every request to `handler`
    pub fn router<H: Handler>(&self, handler: Arc<H>) -> Router {
        let shared = Shared {
            handler,
            config: Arc::new(self.config.clone()),
            sink: Arc::clone(&self.sink),
        };

        // Each layer wraps the ones added before it
        Router::new()
            .fallback(dispatch_request::<H>)
            .with_state(shared)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            .layer(sensitive_headers_layer())
            .layer(request_id_propagation_layer())
            .layer(request_id_layer())
            .layer(RequestBodyLimitLayer::new(
                self.config.request.body_limit_bytes(),
            ))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.service.timeout(),
            ))
            .layer(CatchPanicLayer::new())
    }

    /// Bind the configured port and serve until SIGINT or SIGTERM
    pub async fn serve<H: Handler>(self, handler: Arc<H>) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));
        let listener = TcpListener::bind(&addr).await?;
        self.serve_on(listener, handler).await
    }

    /// Serve on an already bound listener
    pub async fn serve_on<H: Handler>(self, listener: TcpListener, handler: Arc<H>) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!("Starting {} on {}", self.config.service.name, addr);
        self.log_config();

        let app = self.router(handler);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    fn log_config(&self) {
        tracing::info!("Request handling:");
        tracing::info!("  - Panic recovery: enabled");
        tracing::info!("  - Request ID tracking: enabled");
        tracing::info!("  - User header: {}", self.config.request.user_header);
        tracing::info!(
            "  - Request body limit: {} KiB",
            self.config.request.body_limit_kb
        );
        tracing::info!(
            "  - Request timeout: {} seconds",
            self.config.service.timeout_secs
        );
        match &self.config.cors {
            Some(cors) => tracing::info!("  - CORS origin: {}", cors.origin),
            None => tracing::info!("  - CORS: not configured"),
        }
    }
}

async fn dispatch_request<H: Handler>(
    State(shared): State<Shared<H>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(flags): Query<Vec<(String, String)>>,
    body: Bytes,
) -> HttpResponder {
    let request = Request::new(Action::from(&method), Path::from(uri))
        .with_body(body)
        .with_flags(flags);

    let mut ctx = Ctx::new(request, HttpResponder::new()).with_sink(Arc::clone(&shared.sink));

    let user = headers
        .get(shared.config.request.user_header.as_str())
        .and_then(|value| value.to_str().ok());
    if let Some(user) = user {
        ctx = ctx.with_user(user);
    }

    if let Some(cors) = &shared.config.cors {
        ctx.response_mut()
            .enable_cors(&cors.origin, &cors.methods, &cors.headers);
    }

    tracing::debug!(action = %ctx.action(), path = %ctx.path(), "---> request");

    ctx.serve(shared.handler.as_ref())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CorsConfig, diagnostics::MemorySink, handler::HandlerResult,
        routes::ActionRoutes,
    };
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApi;

    impl Handler for TestApi {
        fn handle<R: Responder>(&self, ctx: &mut Ctx<R>) -> HandlerResult {
            match ctx.path().next() {
                "ping" => {
                    ctx.path_mut().increment();
                    ActionRoutes::new()
                        .read(|ctx| ctx.json("pong"))
                        .options(|ctx| ctx.no_content())
                        .run(ctx)
                }
                "echo" => {
                    let body: Value = ctx
                        .request()
                        .bind()
                        .map_err(|e| ctx.bad_request(format!("invalid JSON: {e}")))?;
                    ctx.json(&body)
                }
                "flags" => {
                    let flags = ctx.request().flags().clone();
                    ctx.json(&flags)
                }
                "private" => Err(ctx.unauthorized().into()),
                _ => Err(ctx.not_found().into()),
            }
        }
    }

    fn app(config: Config) -> (Router, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let router = Server::new(config)
            .with_sink(sink.clone())
            .router(Arc::new(TestApi));
        (router, sink)
    }

    async fn call(router: Router, request: http::Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    fn get(uri: &str) -> http::Request<Body> {
        http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.port, config.service.port);
    }

    #[tokio::test]
    async fn test_success_body_and_request_id() {
        let (router, _) = app(Config::default());
        let (status, headers, body) = call(router, get("/ping")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("pong"));
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_not_found_is_dispatched_and_logged() {
        let (router, sink) = app(Config::default());
        let (status, _, body) = call(router, get("/widgets/42")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "not found" }));
        assert!(sink.contains("/widgets/42"));
    }

    #[tokio::test]
    async fn test_unmapped_method_is_method_not_allowed() {
        let (router, _) = app(Config::default());
        let request = http::Request::builder()
            .method(Method::PATCH)
            .uri("/ping")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = call(router, request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "message": "method not allowed" }));
    }

    #[tokio::test]
    async fn test_user_header_reaches_diagnostics() {
        let (router, sink) = app(Config::default());
        let request = http::Request::builder()
            .uri("/private")
            .header("x-user", "mallory")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = call(router, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "unauthorized" }));
        assert!(sink.contains("user: mallory is unauthorized to request: /private"));
    }

    #[tokio::test]
    async fn test_body_is_bound() {
        let (router, _) = app(Config::default());
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .body(Body::from(r#"{"name":"gear"}"#))
            .unwrap();
        let (status, _, body) = call(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "name": "gear" }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (router, _) = app(Config::default());
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .body(Body::from("{"))
            .unwrap();
        let (status, _, body) = call(router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("invalid JSON"));
    }

    #[tokio::test]
    async fn test_query_becomes_flags() {
        let (router, _) = app(Config::default());
        let (status, _, body) = call(router, get("/flags?tag=a&tag=b&limit=5")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "tag": ["a", "b"], "limit": ["5"] }));
    }

    #[tokio::test]
    async fn test_cors_headers_from_config() {
        let mut config = Config::default();
        config.cors = Some(CorsConfig {
            origin: "https://example.com".to_string(),
            ..CorsConfig::default()
        });
        let (router, _) = app(config);
        let request = http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/ping")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = call(router, request).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "https://example.com"
        );
        assert!(headers.contains_key("access-control-allow-methods"));
        assert!(headers.contains_key("access-control-allow-headers"));
    }
}
