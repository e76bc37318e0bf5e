//! Extractors: values built from the request before handler code runs.
//!
//! Every handler argument goes through [`FromRequestParts`]. Path and query
//! values are decoded by `serde`, so coercion rules (integers, enums,
//! optional fields, defaults) are whatever the target type declares.
//! Failures are turned into a 422 naming the rejected field.

use std::any::type_name;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

use http::StatusCode;
use http::request::Parts;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, FieldError, Location};
use crate::response::{BoxBody, IntoResponse, with_body};
use crate::state::AppState;

/// Parameters captured by the matched route template, already percent-decoded,
/// in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserializes the captured parameters into `T`, one field per parameter.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish();
        deserialize_pairs(&encoded, Location::Path)
    }
}

impl From<Vec<(String, String)>> for PathParams {
    fn from(params: Vec<(String, String)>) -> Self {
        Self(params)
    }
}

/// Builds a value from the request head, the matched path parameters and
/// the application state.
pub trait FromRequestParts: Sized + Send {
    fn from_request_parts(
        parts: &Parts,
        params: &PathParams,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Error>> + Send;
}

/// Decodes `a=1&b=x` style input into `T`, reporting the failing field.
/// A key given more than once keeps its last value.
pub(crate) fn deserialize_pairs<T: DeserializeOwned>(
    encoded: &str,
    location: Location,
) -> Result<T, Error> {
    let encoded = last_values(encoded);
    let deserializer =
        serde_urlencoded::Deserializer::new(form_urlencoded::parse(encoded.as_bytes()));
    serde_path_to_error::deserialize(deserializer).map_err(|e| reject(&encoded, location, e))
}

fn last_values(encoded: &str) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in form_urlencoded::parse(encoded.as_bytes()) {
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value.into_owned(),
            None => pairs.push((key.into_owned(), value.into_owned())),
        }
    }
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn reject(
    encoded: &str,
    location: Location,
    err: serde_path_to_error::Error<serde_urlencoded::de::Error>,
) -> Error {
    let msg = err.inner().to_string();

    if let Some(field) = missing_field(&msg) {
        return Error::invalid_fields(vec![FieldError::new(
            "missing", location, field, "Field required", None,
        )]);
    }

    // Tied to the wording of `serde::de::Error::unknown_variant`.
    let kind = if msg.starts_with("unknown variant") {
        "enum"
    } else {
        "parsing"
    };

    let field = match err.path().iter().next() {
        Some(_) => err.path().to_string(),
        None => match quoted_name(&msg) {
            Some(name) => name.to_string(),
            None => {
                return Error::invalid_fields(vec![FieldError::at(location, kind, msg, None)]);
            }
        },
    };
    let input = form_urlencoded::parse(encoded.as_bytes())
        .find(|(key, _)| *key == field)
        .map(|(_, value)| value.into_owned());

    Error::invalid_fields(vec![FieldError::new(kind, location, field, msg, input)])
}

// serde reports absent fields as "missing field `name`".
fn missing_field(msg: &str) -> Option<&str> {
    msg.strip_prefix("missing field `")?.strip_suffix('`')
}

// First backquoted name in a serde message, e.g. "duplicate field `skip`".
fn quoted_name(msg: &str) -> Option<&str> {
    let (_, rest) = msg.split_once('`')?;
    let (name, _) = rest.split_once('`')?;
    Some(name).filter(|name| !name.is_empty())
}

/// Typed route parameters, e.g. `Path<ItemPath>` for `/items/{item_id}`.
#[derive(Debug, Clone)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Path<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned + Send> FromRequestParts for Path<T> {
    async fn from_request_parts(
        _parts: &Parts,
        params: &PathParams,
        _state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        params.deserialize().map(Path)
    }
}

/// Typed query string. A missing query string is treated as empty, so a
/// struct made only of optional and defaulted fields always extracts.
#[derive(Debug, Clone)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Query<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned + Send> FromRequestParts for Query<T> {
    async fn from_request_parts(
        parts: &Parts,
        _params: &PathParams,
        _state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        let query = parts.uri.query().unwrap_or("");
        deserialize_pairs(query, Location::Query).map(Query)
    }
}

/// A clone of a value registered with `Sendero::state`.
#[derive(Debug, Clone)]
pub struct State<T>(pub T);

impl<T> Deref for State<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Clone + Send + Sync + 'static> FromRequestParts for State<T> {
    async fn from_request_parts(
        _parts: &Parts,
        _params: &PathParams,
        state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        state.get::<T>().cloned().map(State).ok_or_else(|| {
            Error::internal(format!("state `{}` is not registered", type_name::<T>()))
        })
    }
}

pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> http::Response<BoxBody> {
        match serde_json::to_vec(&self.0) {
            Ok(body) => with_body(StatusCode::OK, "application/json", body),
            Err(e) => Error::internal(format!("failed to serialize response: {}", e))
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce;
    use crate::test::{TestRequest, empty_state, params, state_with};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ItemPath {
        item_id: i64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Color {
        Red,
        Green,
    }

    #[derive(Debug, Deserialize)]
    struct ColorPath {
        color: Color,
    }

    #[derive(Debug, Deserialize)]
    struct SearchQuery {
        q: Option<String>,
        #[serde(default)]
        skip: usize,
        #[serde(default, deserialize_with = "coerce::flag")]
        short: bool,
    }

    #[derive(Debug, Deserialize)]
    struct NeedyQuery {
        #[allow(dead_code)]
        needy: String,
    }

    #[tokio::test]
    async fn test_path_coerces_integer() {
        let (parts, _) = TestRequest::get("/items/42").into_parts();
        let p = Path::<ItemPath>::from_request_parts(
            &parts,
            &params(&[("item_id", "42")]),
            &empty_state(),
        )
        .await
        .unwrap();
        assert_eq!(p.item_id, 42);
    }

    #[tokio::test]
    async fn test_path_rejects_non_integer_with_location() {
        let (parts, _) = TestRequest::get("/items/foo").into_parts();
        let err = Path::<ItemPath>::from_request_parts(
            &parts,
            &params(&[("item_id", "foo")]),
            &empty_state(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, 422);
        assert_eq!(err.fields.len(), 1);
        assert_eq!(err.fields[0].kind, "parsing");
        assert_eq!(err.fields[0].loc, vec!["path", "item_id"]);
        assert_eq!(err.fields[0].input.as_deref(), Some("foo"));
    }

    #[tokio::test]
    async fn test_path_enum_accepts_literal_and_rejects_others() {
        let (parts, _) = TestRequest::get("/").into_parts();
        let ok = Path::<ColorPath>::from_request_parts(
            &parts,
            &params(&[("color", "green")]),
            &empty_state(),
        )
        .await
        .unwrap();
        assert_eq!(ok.color, Color::Green);

        let err = Path::<ColorPath>::from_request_parts(
            &parts,
            &params(&[("color", "Red")]),
            &empty_state(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.fields[0].kind, "enum");
        assert_eq!(err.fields[0].loc, vec!["path", "color"]);
    }

    #[tokio::test]
    async fn test_path_value_with_reserved_characters_survives() {
        let (parts, _) = TestRequest::get("/").into_parts();
        #[derive(Deserialize)]
        struct FilePath {
            file_path: String,
        }
        let p = Path::<FilePath>::from_request_parts(
            &parts,
            &params(&[("file_path", "/home/a&b=c d.txt")]),
            &empty_state(),
        )
        .await
        .unwrap();
        assert_eq!(p.file_path, "/home/a&b=c d.txt");
    }

    #[tokio::test]
    async fn test_query_defaults_when_absent() {
        let (parts, _) = TestRequest::get("/items/").into_parts();
        let q = Query::<SearchQuery>::from_request_parts(&parts, &PathParams::new(), &empty_state())
            .await
            .unwrap();
        assert_eq!(q.q, None);
        assert_eq!(q.skip, 0);
        assert!(!q.short);
    }

    #[tokio::test]
    async fn test_query_parses_values() {
        let (parts, _) = TestRequest::get("/items/?q=hello%20world&skip=2&short=Yes").into_parts();
        let q = Query::<SearchQuery>::from_request_parts(&parts, &PathParams::new(), &empty_state())
            .await
            .unwrap();
        assert_eq!(q.q.as_deref(), Some("hello world"));
        assert_eq!(q.skip, 2);
        assert!(q.short);
    }

    #[tokio::test]
    async fn test_query_rejects_invalid_flag() {
        let (parts, _) = TestRequest::get("/items/?short=maybe").into_parts();
        let err = Query::<SearchQuery>::from_request_parts(&parts, &PathParams::new(), &empty_state())
            .await
            .unwrap_err();
        assert_eq!(err.status, 422);
        assert_eq!(err.fields[0].loc, vec!["query", "short"]);
        assert_eq!(err.fields[0].input.as_deref(), Some("maybe"));
    }

    #[tokio::test]
    async fn test_query_missing_required_field() {
        let (parts, _) = TestRequest::get("/items/foo/needy").into_parts();
        let err = Query::<NeedyQuery>::from_request_parts(&parts, &PathParams::new(), &empty_state())
            .await
            .unwrap_err();
        assert_eq!(err.status, 422);
        assert_eq!(err.fields[0].kind, "missing");
        assert_eq!(err.fields[0].loc, vec!["query", "needy"]);
        assert_eq!(err.fields[0].input, None);
    }

    #[tokio::test]
    async fn test_query_repeated_key_keeps_last_value() {
        let (parts, _) = TestRequest::get("/items/?skip=0&skip=2&q=a&q=b").into_parts();
        let q = Query::<SearchQuery>::from_request_parts(&parts, &PathParams::new(), &empty_state())
            .await
            .unwrap();
        assert_eq!(q.skip, 2);
        assert_eq!(q.q.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_query_repeated_key_reports_last_input() {
        let (parts, _) = TestRequest::get("/items/?skip=1&skip=x").into_parts();
        let err = Query::<SearchQuery>::from_request_parts(&parts, &PathParams::new(), &empty_state())
            .await
            .unwrap_err();
        assert_eq!(err.fields[0].loc, vec!["query", "skip"]);
        assert_eq!(err.fields[0].input.as_deref(), Some("x"));
    }

    #[test]
    fn test_root_level_error_names_no_dot_field() {
        let err = deserialize_pairs::<u32>("a=1", Location::Query).unwrap_err();
        assert_eq!(err.status, 422);
        assert!(err.fields[0].loc.iter().all(|part| part != "."));
        assert_eq!(err.fields[0].loc[0], "query");
    }

    #[test]
    fn test_quoted_name() {
        assert_eq!(quoted_name("duplicate field `skip`"), Some("skip"));
        assert_eq!(quoted_name("invalid digit found in string"), None);
        assert_eq!(quoted_name("empty ``"), None);
    }

    #[tokio::test]
    async fn test_state_clones_registered_value() {
        let (parts, _) = TestRequest::get("/").into_parts();
        let state = state_with(String::from("shared"));
        let s = State::<String>::from_request_parts(&parts, &PathParams::new(), &state)
            .await
            .unwrap();
        assert_eq!(s.as_str(), "shared");
    }

    #[tokio::test]
    async fn test_state_missing_is_internal_error() {
        let (parts, _) = TestRequest::get("/").into_parts();
        let err = State::<String>::from_request_parts(&parts, &PathParams::new(), &empty_state())
            .await
            .unwrap_err();
        assert_eq!(err.status, 500);
    }

    #[test]
    fn test_path_params_lookup() {
        let p = params(&[("user_id", "7"), ("item_id", "x")]);
        assert_eq!(p.get("item_id"), Some("x"));
        assert_eq!(p.get("nope"), None);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_json_response() {
        let response = Json(serde_json::json!({"a": 1})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
