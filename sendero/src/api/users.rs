use serde::{Deserialize, Serialize};

use crate::api::items::{ItemDetail, ItemQuery};
use crate::extract::{Json, Path, Query};
use crate::get;

pub const CURRENT_USER: &str = "the current user";

#[derive(Debug, Serialize)]
pub struct UserRef {
    pub user_id: String,
}

// Must stay ahead of `read_user` in the router.
#[get("/users/me")]
pub async fn read_user_me() -> Json<UserRef> {
    Json(UserRef {
        user_id: CURRENT_USER.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub user_id: String,
}

#[get("/users/{user_id}")]
pub async fn read_user(path: Path<UserPath>) -> Json<UserRef> {
    Json(UserRef {
        user_id: path.into_inner().user_id,
    })
}

#[derive(Debug, Deserialize)]
pub struct UserItemPath {
    pub user_id: i64,
    pub item_id: String,
}

#[get("/users/{user_id}/items/{item_id}")]
pub async fn read_user_item(
    path: Path<UserItemPath>,
    query: Query<ItemQuery>,
) -> Json<ItemDetail<String>> {
    let UserItemPath { user_id, item_id } = path.into_inner();
    Json(ItemDetail {
        item_id,
        owner_id: Some(user_id),
        q: query.search(),
        description: query.description(),
    })
}
