//! The tutorial API: path parameters, query parameters, optional and
//! required parameters, enumerations and route ordering.
//!
//! Every handler is independent. The only shared value is the read-only
//! [`ItemCatalog`] registered by [`app`].

use serde::Serialize;

use crate::app::Sendero;
use crate::extract::Json;
use crate::get;
use crate::router::Router;

pub mod files;
pub mod items;
pub mod models;
pub mod users;

pub use items::{CatalogItem, ItemCatalog};
pub use models::ModelName;

#[derive(Debug, Serialize)]
pub struct Greeting {
    pub message: &'static str,
}

#[get("/")]
pub async fn root() -> Json<Greeting> {
    Json(Greeting {
        message: "Hello World",
    })
}

/// The tutorial routes, in the order they are tried.
///
/// `/users/me` is registered before `/users/{user_id}`; the other way round
/// the parametrized route would capture `me` as a user id.
pub fn router() -> Router {
    Router::new()
        .handler(root)
        .handler(items::list_items)
        .handler(items::read_item)
        .handler(items::read_item_needy)
        .handler(users::read_user_me)
        .handler(users::read_user)
        .handler(users::read_user_item)
        .handler(models::get_model)
        .handler(files::read_file)
}

/// The tutorial application with its default catalog.
pub fn app() -> Sendero {
    Sendero::new().state(ItemCatalog::default()).router(router())
}
