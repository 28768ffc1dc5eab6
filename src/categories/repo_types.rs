use sqlx::FromRow;
use time::OffsetDateTime;

use super::entity::Category;

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub name: String,
}

impl CategoryRow {
    pub fn into_entity(self, products: Vec<i64>) -> Category {
        Category {
            id: Some(self.id),
            created_at: self.created_at,
            updated_at: self.updated_at,
            name: self.name,
            products,
        }
    }
}
