use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;

use super::entity::Product;
use super::price::Price;

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub size: Option<String>,
    pub composition: Option<String>,
    pub manufacturer: Option<String>,
    pub description_internal: Option<String>,
    pub category_id: i64,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: Some(r.id),
            created_at: r.created_at,
            updated_at: r.updated_at,
            name: r.name,
            description: r.description,
            price: Some(Price::new(r.price)),
            size: r.size,
            composition: r.composition,
            manufacturer: r.manufacturer,
            category_id: Some(r.category_id),
            description_internal: r.description_internal,
        }
    }
}
