//! Catalog records and response mapping
//!
//! Remote search responses are decoded into [`CatalogResponse`] and each
//! entity is mapped into the [`CatalogItem`] that gets stored.

use serde::{Deserialize, Serialize};

/// One integration as stored in the key/value store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub url: String,
    pub icon: Option<String>,
    pub color: String,
}

/// Body of a catalog search response
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    pub total: u64,
    #[serde(default)]
    pub entities: Vec<RemoteEntity>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

/// One record in a search response
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntity {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub icon: Option<RemoteIcon>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteIcon {
    #[serde(default)]
    pub url: Option<String>,
}

impl RemoteEntity {
    /// Maps the record, deriving the public URL from `url_prefix` and the slug
    ///
    /// A record without an icon yields an item with `icon: None`.
    pub fn into_item(self, url_prefix: &str) -> CatalogItem {
        CatalogItem {
            url: format!("{}{}", url_prefix, self.slug),
            name: self.name,
            icon: self.icon.and_then(|icon| icon.url),
            color: self.theme,
        }
    }
}

impl CatalogResponse {
    /// Maps every entity in the response
    pub fn into_items(self, url_prefix: &str) -> Vec<CatalogItem> {
        self.entities
            .into_iter()
            .map(|entity| entity.into_item(url_prefix))
            .collect()
    }
}
