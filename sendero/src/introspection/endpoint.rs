use std::sync::Arc;

use http::{Request, Response};
use hyper::body::Incoming;

use crate::error::Error;
use crate::extract::{Json, PathParams};
use crate::introspection::RouteInfo;
use crate::response::{BoxBody, IntoResponse};
use crate::state::AppState;

pub const ROUTES_PATH: &str = "/__sendero/routes";

/// Snapshot of the route table, stored in application state.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: Vec<RouteInfo>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn with_routes(routes: Vec<RouteInfo>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }
}

pub async fn list_routes(
    _req: Request<Incoming>,
    _params: PathParams,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    match state.get::<RouteRegistry>() {
        Some(registry) => Json(registry.routes()).into_response(),
        None => Error::not_found("Not Found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, StatusCode};
    use serde_json::Value;

    use crate::{app::Sendero, router::Router, testing::TestClient};

    use super::*;

    #[test]
    fn test_route_registry_with_routes() {
        let registry = RouteRegistry::with_routes(vec![
            RouteInfo::new("GET", "/users/me", "read_user_me"),
            RouteInfo::new("GET", "/users/{user_id}", "read_user"),
        ]);
        assert_eq!(registry.routes().len(), 2);
        assert_eq!(registry.routes()[1].path, "/users/{user_id}");
        assert!(RouteRegistry::new().routes().is_empty());
    }

    #[tokio::test]
    async fn test_list_routes_returns_json_in_order() {
        let router = Router::new()
            .get("/hello", |_, _, _| async { "hello" })
            .get("/hello/{name}", |_, _, _| async { "hello you" });
        let app = Sendero::new().router(router).with_introspection(true);
        let client = TestClient::new(app).await;
        let response = client.get(ROUTES_PATH).send().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );

        let json = response.json::<Value>();
        assert_eq!(json[0]["method"], "GET");
        assert_eq!(json[0]["path"], "/hello");
        assert_eq!(json[0]["handler_name"], "handler");
        assert_eq!(json[1]["path"], "/hello/{name}");
    }

    #[tokio::test]
    async fn test_list_routes_is_404_when_disabled() {
        let router = Router::new().get("/hello", |_, _, _| async { "hello" });
        let app = Sendero::new().router(router).with_introspection(false);
        let client = TestClient::new(app).await;
        let response = client.get(ROUTES_PATH).send().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
