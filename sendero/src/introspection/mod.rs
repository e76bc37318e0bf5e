//! Route table introspection.
//!
//! When enabled, the application serves its own route table as JSON at
//! [`ROUTES_PATH`], in the order the routes are tried.

mod endpoint;
mod route_info;

pub use endpoint::{ROUTES_PATH, RouteRegistry, list_routes};
pub use route_info::RouteInfo;
