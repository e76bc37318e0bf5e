use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::extract::{Json, Path, Query, State};
use crate::get;

pub const DEFAULT_LIMIT: usize = 10;

pub(crate) const LONG_DESCRIPTION: &str = "This is an amazing item that has a long description";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    pub item_name: String,
}

impl CatalogItem {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
        }
    }
}

/// A fixed, ordered list of items served by `GET /items/`.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    items: Arc<[CatalogItem]>,
}

impl ItemCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// At most `limit` items, in catalog order, starting at `skip`.
    pub fn slice(&self, skip: usize, limit: usize) -> &[CatalogItem] {
        let start = skip.min(self.items.len());
        let end = start.saturating_add(limit).min(self.items.len());
        &self.items[start..end]
    }
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self::new(vec![
            CatalogItem::new("Foo"),
            CatalogItem::new("Bar"),
            CatalogItem::new("Baz"),
        ])
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[get("/items/")]
pub async fn list_items(
    query: Query<ListQuery>,
    catalog: State<ItemCatalog>,
) -> Json<Vec<CatalogItem>> {
    Json(catalog.slice(query.skip, query.limit).to_vec())
}

#[derive(Debug, Deserialize)]
pub struct ItemPath {
    pub item_id: i64,
}

/// Optional filters shared by the item detail routes.
#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub q: Option<String>,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub short: bool,
}

impl ItemQuery {
    /// `q`, unless it was absent or empty.
    pub fn search(&self) -> Option<String> {
        self.q.clone().filter(|q| !q.is_empty())
    }

    pub fn description(&self) -> Option<&'static str> {
        (!self.short).then_some(LONG_DESCRIPTION)
    }
}

#[derive(Debug, Serialize)]
pub struct ItemDetail<Id> {
    pub item_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

#[get("/items/{item_id}")]
pub async fn read_item(path: Path<ItemPath>, query: Query<ItemQuery>) -> Json<ItemDetail<i64>> {
    Json(ItemDetail {
        item_id: path.item_id,
        owner_id: None,
        q: query.search(),
        description: query.description(),
    })
}

#[derive(Debug, Deserialize)]
pub struct NeedyPath {
    pub item_id: String,
}

/// `needy` is required, `skip` has a default, `limit` is optional.
#[derive(Debug, Deserialize)]
pub struct NeedyQuery {
    pub needy: String,
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NeedyItem {
    pub item_id: String,
    pub needy: String,
    pub skip: i64,
    pub limit: Option<i64>,
}

#[get("/items/{item_id}/needy")]
pub async fn read_item_needy(path: Path<NeedyPath>, query: Query<NeedyQuery>) -> Json<NeedyItem> {
    let Path(NeedyPath { item_id }) = path;
    let Query(NeedyQuery { needy, skip, limit }) = query;
    Json(NeedyItem {
        item_id,
        needy,
        skip,
        limit,
    })
}
