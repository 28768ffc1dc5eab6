use time::OffsetDateTime;
use validator::Validate;

use crate::error::Violation;
use crate::validation;

pub const NAME_TAKEN: &str = "This Category is already exists";

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Category {
    /// Unset until the row is inserted.
    pub id: Option<i64>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    #[validate(length(min = 3, max = 255))]
    pub name: String,
    /// Ids of the products filed under this category.
    pub products: Vec<i64>,
}

impl Category {
    pub fn new() -> Self {
        Self {
            id: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            name: String::new(),
            products: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_products(&mut self, products: Vec<i64>) -> &mut Self {
        self.products = products;
        self
    }

    /// Stamps `updated_at`; called by the update path right before persisting.
    pub fn touch(&mut self) -> &mut Self {
        self.updated_at = Some(OffsetDateTime::now_utc());
        self
    }

    pub fn violations(&self) -> Vec<Violation> {
        let mut out = validation::derived(self);
        validation::not_blank("name", &self.name, &mut out);
        out
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::new()
    }
}
