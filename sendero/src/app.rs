//! Application builder and request dispatch.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{HeaderValue, Method, Request, Response, StatusCode, header};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::error::Error;
use crate::introspection::{ROUTES_PATH, RouteRegistry, list_routes};
use crate::response::{BoxBody, IntoResponse};
use crate::router::{Resolved, Router, toggle_trailing_slash};
use crate::state::AppState;

/// How long in-flight connections may keep running after shutdown starts.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Bytes escaped when a decoded path goes back into a `location` header.
const LOCATION_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builder for a Sendero application.
///
/// ```rust,ignore
/// Sendero::new()
///     .state(ItemCatalog::default())
///     .router(sendero::api::router())
///     .listen("127.0.0.1:8000")
///     .await
/// ```
pub struct Sendero {
    router: Router,
    state: AppState,
    introspection: bool,
}

impl Sendero {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            state: AppState::new(),
            introspection: true,
        }
    }

    /// Appends the routes of `router` after those already registered.
    pub fn router(mut self, router: Router) -> Self {
        self.router = self.router.merge(router);
        self
    }

    pub fn state<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.state.insert(value);
        self
    }

    /// Serves the route table at [`ROUTES_PATH`]. On by default.
    pub fn with_introspection(mut self, enabled: bool) -> Self {
        self.introspection = enabled;
        self
    }

    pub(crate) fn build(self) -> App {
        let Sendero {
            mut router,
            mut state,
            introspection,
        } = self;

        if introspection {
            router = router.get(ROUTES_PATH, list_routes);
            state.insert(RouteRegistry::with_routes(router.routes()));
        }

        App {
            router,
            state: Arc::new(state),
        }
    }

    /// Binds `addr` and serves until ctrl-c.
    pub async fn listen(self, addr: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        };
        self.serve(listener, shutdown).await
    }

    /// Serves connections from `listener` until `shutdown` resolves, then
    /// drains in-flight connections.
    pub async fn serve<S>(self, listener: TcpListener, shutdown: S) -> std::io::Result<()>
    where
        S: Future<Output = ()>,
    {
        let app = Arc::new(self.build());
        let local_addr = listener.local_addr()?;
        let graceful = GracefulShutdown::new();

        tracing::info!(
            addr = %local_addr,
            routes = app.router.len(),
            "server listening"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };

                    let app = app.clone();
                    let service = service_fn(move |req: Request<Incoming>| {
                        let app = app.clone();
                        async move { Ok::<_, Infallible>(app.handle(req).await) }
                    });

                    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            tracing::debug!(%peer, error = %e, "connection closed with error");
                        }
                    });
                }
                _ = &mut shutdown => {
                    tracing::info!("shutdown signal received");
                    break;
                }
            }
        }

        drop(listener);

        tokio::select! {
            _ = graceful.shutdown() => {
                tracing::info!("all connections closed");
            }
            _ = tokio::time::sleep(DRAIN_TIMEOUT) => {
                tracing::warn!(timeout_secs = DRAIN_TIMEOUT.as_secs(), "drain timed out");
            }
        }

        Ok(())
    }
}

impl Default for Sendero {
    fn default() -> Self {
        Self::new()
    }
}

/// A built application, shared by every connection.
pub(crate) struct App {
    router: Router,
    state: Arc<AppState>,
}

impl App {
    pub(crate) async fn handle(&self, req: Request<Incoming>) -> Response<BoxBody> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "http_request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %request_id,
        );

        async move {
            let started = Instant::now();
            let mut response = self.dispatch(req).await;

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            tracing::info!(
                status = response.status().as_u16(),
                latency_ms = started.elapsed().as_millis() as u64,
                "request completed"
            );
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, req: Request<Incoming>) -> Response<BoxBody> {
        let path = match percent_decode_str(req.uri().path()).decode_utf8() {
            Ok(path) => path.into_owned(),
            Err(e) => {
                return Error::bad_request(format!("request path is not valid UTF-8: {}", e))
                    .into_response();
            }
        };

        match self.router.resolve(req.method(), &path) {
            Resolved::Found { handler, params } => handler(req, params, self.state.clone()).await,
            Resolved::MethodNotAllowed(methods) => method_not_allowed(&methods),
            Resolved::Redirect(alternate) => {
                let location = redirect_path(req.uri().path(), &alternate);
                redirect(location, req.uri().query())
            }
            Resolved::NotFound => Error::not_found("Not Found").into_response(),
        }
    }
}

fn method_not_allowed(methods: &[Method]) -> Response<BoxBody> {
    let allow = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut response = Error::method_not_allowed("Method Not Allowed").into_response();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

/// The redirect target for `alternate`, the decoded path that matched.
///
/// Toggling the slash on the raw path keeps the client's escapes. When that
/// does not decode to `alternate` (an escaped trailing `%2F`), the decoded
/// path is escaped again instead.
fn redirect_path(raw: &str, alternate: &str) -> String {
    if let Some(toggled) = toggle_trailing_slash(raw) {
        let same = percent_decode_str(&toggled)
            .decode_utf8()
            .is_ok_and(|decoded| decoded == alternate);
        if same {
            return toggled;
        }
    }
    utf8_percent_encode(alternate, LOCATION_ESCAPE).to_string()
}

fn redirect(path: String, query: Option<&str>) -> Response<BoxBody> {
    let location = match query {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };
    let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestClient;

    fn app() -> Sendero {
        Sendero::new().with_introspection(false).router(
            Router::new()
                .get("/items/", |_, _, _| async { "items" })
                .get("/users/{user_id}", |_, params: crate::extract::PathParams, _| async move {
                    params.get("user_id").unwrap_or_default().to_string()
                })
                .route(Method::POST, "/things", |_, _, _| async { "posted" }),
        )
    }

    #[tokio::test]
    async fn test_request_id_header_is_set() {
        let client = TestClient::new(app()).await;
        let response = client.get("/items/").send().await;
        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert_eq!(id.to_str().unwrap().len(), 36);
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let client = TestClient::new(app()).await;
        let response = client.get("/missing").send().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<serde_json::Value>(),
            serde_json::json!({ "detail": "Not Found" })
        );
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_with_allow() {
        let client = TestClient::new(app()).await;
        let response = client.get("/things").send().await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    }

    #[tokio::test]
    async fn test_missing_trailing_slash_redirects_with_query() {
        let client = TestClient::new(app()).await;
        let response = client.get("/items?skip=1").send().await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/items/?skip=1"
        );
    }

    #[tokio::test]
    async fn test_redirect_keeps_escaped_path_characters() {
        let client = TestClient::new(app()).await;

        let response = client.get("/users/a%3Fb/").send().await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/users/a%3Fb");

        let response = client.get("/users/100%25/?q=1").send().await;
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/users/100%25?q=1"
        );
    }

    #[test]
    fn test_redirect_path_escapes_when_raw_toggle_differs() {
        assert_eq!(redirect_path("/items", "/items/"), "/items/");
        assert_eq!(redirect_path("/users/a%3Fb/", "/users/a?b"), "/users/a%3Fb");
        // `%2F` decodes to the slash that was toggled away.
        assert_eq!(redirect_path("/users/a%20b%2F", "/users/a b"), "/users/a%20b");
    }

    #[tokio::test]
    async fn test_path_is_percent_decoded_before_matching() {
        let client = TestClient::new(app()).await;
        let response = client.get("/users/john%20doe").send().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text(), "john doe");
    }

    #[tokio::test]
    async fn test_invalid_utf8_path_is_400() {
        let client = TestClient::new(app()).await;
        let response = client.get("/users/%FF%FE").send().await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_state_is_shared_with_handlers() {
        let app = Sendero::new()
            .with_introspection(false)
            .state(String::from("from state"))
            .router(Router::new().get("/", |_, _, state: Arc<AppState>| async move {
                state.get::<String>().cloned().unwrap_or_default()
            }));
        let client = TestClient::new(app).await;
        assert_eq!(client.get("/").send().await.text(), "from state");
    }
}
