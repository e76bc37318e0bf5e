//! Tests for handlers generated by the route attribute macros.

use http::StatusCode;
use sendero::prelude::*;
use sendero::testing::TestClient;

#[derive(Clone)]
struct Prefix(&'static str);

#[derive(Deserialize)]
struct NamePath {
    name: String,
}

#[derive(Deserialize)]
struct CountQuery {
    #[serde(default)]
    times: u8,
}

/// Greets `name`.
#[get("/hello/{name}")]
async fn hello(path: Path<NamePath>, prefix: State<Prefix>) -> String {
    format!("{} {}", prefix.0.0, path.name)
}

#[get("/repeat/{name}")]
async fn repeat(path: Path<NamePath>, query: Query<CountQuery>) -> Result<String> {
    if query.times == 0 {
        return Err(Error::bad_request("times must be positive"));
    }
    Ok(path.name.repeat(query.times as usize))
}

#[post("/things")]
async fn create_thing() -> StatusCode {
    StatusCode::CREATED
}

#[delete("/things/{name}")]
async fn delete_thing(_path: Path<NamePath>) -> StatusCode {
    StatusCode::NO_CONTENT
}

#[get("/needs-state")]
async fn needs_state(prefix: State<Prefix>) -> &'static str {
    prefix.0.0
}

fn app() -> Sendero {
    Sendero::new()
        .with_introspection(false)
        .state(Prefix("hi"))
        .router(
            Router::new()
                .handler(hello)
                .handler(repeat)
                .handler(create_thing)
                .handler(delete_thing),
        )
}

#[test]
fn test_handler_constants() {
    assert_eq!(<hello as Handler>::NAME, "hello");
    assert_eq!(<hello as Handler>::PATH, "/hello/{name}");
    assert_eq!(<hello as Handler>::METHOD, http::Method::GET);
    assert_eq!(<create_thing as Handler>::METHOD, http::Method::POST);
    assert_eq!(<delete_thing as Handler>::METHOD, http::Method::DELETE);
}

#[tokio::test]
async fn test_extractors_feed_the_body() {
    let client = TestClient::new(app()).await;
    let response = client.get("/hello/ana").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "hi ana");
}

#[tokio::test]
async fn test_handler_error_becomes_response() {
    let client = TestClient::new(app()).await;
    let response = client.get("/repeat/ab").send().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({ "detail": "times must be positive" })
    );

    let response = client.get("/repeat/ab?times=3").send().await;
    assert_eq!(response.text(), "ababab");
}

#[tokio::test]
async fn test_extractor_failure_short_circuits() {
    let client = TestClient::new(app()).await;
    let response = client.get("/repeat/ab?times=lots").send().await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = response.json();
    assert_eq!(json["detail"][0]["loc"], serde_json::json!(["query", "times"]));
}

#[tokio::test]
async fn test_non_get_methods() {
    let client = TestClient::new(app()).await;
    assert_eq!(
        client.post("/things").send().await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        client
            .request(http::Method::DELETE, "/things/x")
            .send()
            .await
            .status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        client.get("/things").send().await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_missing_state_is_internal_error() {
    let app = Sendero::new()
        .with_introspection(false)
        .router(Router::new().handler(needs_state));
    let client = TestClient::new(app).await;
    let response = client.get("/needs-state").send().await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
