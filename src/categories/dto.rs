use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::entity::Category;
use crate::iri::product_iri;

/// Read view of a category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRead {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub name: String,
    pub products: Vec<String>,
}

impl CategoryRead {
    /// `category` must have been persisted.
    pub fn view(category: &Category) -> Self {
        Self {
            id: category.id.unwrap_or_default(),
            created_at: category.created_at,
            updated_at: category.updated_at,
            name: category.name.clone(),
            products: category.products.iter().copied().map(product_iri).collect(),
        }
    }
}

/// Write view of a category. Only `name` is accepted; other keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryInput {
    pub name: Option<String>,
}

impl CategoryInput {
    /// POST / PUT: every writable field is taken from the input.
    pub fn replace(self, category: &mut Category) {
        category.set_name(self.name.unwrap_or_default());
    }

    /// PATCH: only submitted fields change.
    pub fn merge(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.set_name(name);
        }
    }
}
