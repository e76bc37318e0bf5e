//! Sendero: typed path and query parameter routing on hyper, and the
//! tutorial API built with it.
//!
//! ```rust,ignore
//! use sendero::prelude::*;
//!
//! #[derive(Deserialize)]
//! struct ItemPath {
//!     item_id: i64,
//! }
//!
//! #[get("/items/{item_id}")]
//! async fn read_item(path: Path<ItemPath>) -> String {
//!     format!("item {}", path.item_id)
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     Sendero::new()
//!         .router(Router::new().handler(read_item))
//!         .listen("127.0.0.1:8000")
//!         .await
//! }
//! ```

// Lets the route macros name `::sendero` from inside this crate too.
extern crate self as sendero;

pub mod api;
pub mod app;
pub mod coerce;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod introspection;
pub mod observability;
pub mod response;
pub mod router;
pub mod state;
pub mod testing;


pub use http;
pub use hyper;
pub use sendero_macros::{delete, get, post, put};

pub mod prelude {
    pub use crate::app::Sendero;
    pub use crate::config::{ServerConfig, load_dotenv};
    pub use crate::error::{Error, Result};
    pub use crate::extract::{FromRequestParts, Json, Path, PathParams, Query, State};
    pub use crate::handler::Handler;
    pub use crate::observability::TracingConfig;
    pub use crate::response::IntoResponse;
    pub use crate::router::Router;
    pub use crate::{delete, get, post, put};

    pub use http::StatusCode;
    pub use serde::{Deserialize, Serialize};
}
