//! An HTTP client for exercising an application in tests.
//!
//! [`TestClient::new`] serves the application on an ephemeral local port
//! and talks to it through a real `hyper` client, so requests go through
//! the same connection handling, routing and extraction as in production.
//!
//! ```rust,ignore
//! let client = TestClient::new(Sendero::new().router(api::router())).await;
//! let response = client.get("/items/5?q=somequery").send().await;
//! assert_eq!(response.status(), StatusCode::OK);
//! ```

use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::app::Sendero;

pub struct TestClient {
    addr: SocketAddr,
    client: Client<HttpConnector, Full<Bytes>>,
    _shutdown: oneshot::Sender<()>,
}

impl TestClient {
    /// Starts `app` in the background. It stops when the client is dropped.
    pub async fn new(app: Sendero) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("test listener has no address");
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(e) = app.serve(listener, shutdown).await {
                tracing::error!(error = %e, "test server failed");
            }
        });

        Self {
            addr,
            client: Client::builder(TokioExecutor::new()).build_http(),
            _shutdown: tx,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn request(&self, method: Method, path: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder {
            client: self,
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
        }
    }

    pub fn get(&self, path: &str) -> TestRequestBuilder<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequestBuilder<'_> {
        self.request(Method::POST, path)
    }
}

pub struct TestRequestBuilder<'a> {
    client: &'a TestClient,
    method: Method,
    path: String,
    headers: HeaderMap,
}

impl TestRequestBuilder<'_> {
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        let value = HeaderValue::from_str(value).expect("invalid header value");
        self.headers.insert(HeaderName::from_static(name), value);
        self
    }

    pub async fn send(self) -> TestResponse {
        let uri = format!("http://{}{}", self.client.addr, self.path);
        let mut request = Request::builder()
            .method(self.method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .expect("invalid test request");
        request.headers_mut().extend(self.headers);

        let response = self
            .client
            .client
            .request(request)
            .await
            .expect("test request failed");

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();

        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON, panicking with the raw body on failure.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("response is not valid JSON ({}): {}", e, self.text()))
    }
}
