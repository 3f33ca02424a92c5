//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing)
//! - Serve plain HTTP and TLS transports from the same router
//! - Dispatch requests to the route table and forward them upstream

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::client::UpstreamClient;
use crate::http::forward::forward;
use crate::http::request::{request_span, UuidRequestId};
use crate::http::response;
use crate::lifecycle::shutdown::signalled;
use crate::routing::{RouteMatch, RouteTable};

/// Grace period for in-flight TLS connections on shutdown.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub client: UpstreamClient,
    pub verbose: bool,
}

/// HTTP server for the reverse proxy.
///
/// Cloning shares the route table and upstream client, so both transports
/// serve identical handlers.
#[derive(Clone)]
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(routes: Arc<RouteTable>, client: UpstreamClient, verbose: bool) -> Self {
        let state = AppState {
            routes,
            client,
            verbose,
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "start http server");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `listener` until `shutdown` fires.
    pub async fn run_tls(
        self,
        listener: std::net::TcpListener,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "start https server");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            signalled(shutdown).await;
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::from_tcp_rustls(listener, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!(address = %addr, "HTTPS server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Resolves the route and forwards, redirects or answers 404.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    match state.routes.resolve(request.method(), request.uri()) {
        RouteMatch::Forward(binding) => {
            if state.verbose {
                tracing::info!(
                    remote_addr = ?remote_addr,
                    method = %request.method(),
                    uri = %request.uri(),
                    "Proxying request"
                );
            }
            forward(&state.client, binding, remote_addr, request).await
        }
        RouteMatch::Redirect(location) => {
            tracing::debug!(path = %request.uri().path(), location = %location, "Redirecting to canonical path");
            response::moved_permanently(&location)
        }
        RouteMatch::BadRequest => {
            tracing::debug!(uri = %request.uri(), "Unroutable request target");
            response::bad_request()
        }
        RouteMatch::NotFound => {
            tracing::debug!(path = %request.uri().path(), "No route matched");
            response::not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProxyConfig, RouteConfig};
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn server(entries: &[(&str, &str)]) -> HttpServer {
        server_with_verbosity(entries, true)
    }

    fn server_with_verbosity(entries: &[(&str, &str)], verbose: bool) -> HttpServer {
        let routes: RouteConfig = entries
            .iter()
            .map(|(p, t)| (p.to_string(), t.to_string()))
            .collect();
        let table = Arc::new(RouteTable::from_config(&routes, false));
        let client = UpstreamClient::new(&ProxyConfig::default()).unwrap();
        HttpServer::new(table, client, verbose)
    }

    #[tokio::test]
    async fn unmatched_path_is_404_with_request_id() {
        let app = server(&[("/a", "http://127.0.0.1:9")]).router();

        let response = app
            .oneshot(Request::get("/b").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let app = server(&[]).router();

        let response = app
            .oneshot(
                Request::get("/")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn unclean_path_redirects() {
        let app = server(&[("/a", "http://127.0.0.1:9")]).router();

        let response = app
            .oneshot(Request::get("/a/../a/x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/a/x");
    }

    #[tokio::test]
    async fn asterisk_target_is_bad_request() {
        let app = server(&[("/", "http://127.0.0.1:9")]).router();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("*")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!response.headers().contains_key(header::LOCATION));
    }

    #[tokio::test]
    #[traced_test]
    async fn verbose_mode_logs_forwarded_requests() {
        let app = server(&[("/a", "http://127.0.0.1:9")]).router();

        let response = app
            .oneshot(Request::get("/a/x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(logs_contain("Proxying request"));
        assert!(logs_contain("Upstream request failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn quiet_mode_skips_request_log() {
        let app = server_with_verbosity(&[("/a", "http://127.0.0.1:9")], false).router();

        app.oneshot(Request::get("/a/x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(!logs_contain("Proxying request"));
    }
}
