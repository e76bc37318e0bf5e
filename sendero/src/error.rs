use std::fmt;

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;

use crate::response::{BoxBody, IntoResponse};

/// Where a rejected request value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
        }
    }
}

/// A single rejected field, reported in the `detail` list of a 422 response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub loc: Vec<String>,
    pub msg: String,
    pub input: Option<String>,
}

impl FieldError {
    pub fn new(
        kind: &'static str,
        location: Location,
        field: impl Into<String>,
        msg: impl Into<String>,
        input: Option<String>,
    ) -> Self {
        Self {
            kind,
            loc: vec![location.as_str().to_string(), field.into()],
            msg: msg.into(),
            input,
        }
    }

    /// An error about the `location` as a whole rather than one field.
    pub fn at(
        location: Location,
        kind: &'static str,
        msg: impl Into<String>,
        input: Option<String>,
    ) -> Self {
        Self {
            kind,
            loc: vec![location.as_str().to_string()],
            msg: msg.into(),
            input,
        }
    }
}

#[derive(Debug)]
pub struct Error {
    pub status: u16,
    pub message: String,
    pub fields: Vec<FieldError>,
}

impl Error {
    fn with_status(status: u16, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            fields: Vec::new(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_status(400, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_status(404, msg)
    }

    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::with_status(405, msg)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_status(422, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_status(500, msg)
    }

    /// A 422 carrying the rejected fields.
    pub fn invalid_fields(fields: Vec<FieldError>) -> Self {
        let message = fields
            .iter()
            .map(|f| format!("{}: {}", f.loc.join("."), f.msg))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            status: 422,
            message,
            fields,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self) -> serde_json::Value {
        if self.fields.is_empty() {
            serde_json::json!({ "detail": self.message })
        } else {
            serde_json::json!({ "detail": self.fields })
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> http::Response<BoxBody> {
        let body = serde_json::to_vec(&self.body()).unwrap_or_default();
        let mut response = http::Response::new(http_body_util::Full::new(Bytes::from(body)));
        *response.status_mut() = self.status_code();
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }
}

pub type Result<T> = std::result::Result<T, Error>;
