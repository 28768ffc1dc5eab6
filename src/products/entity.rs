use time::OffsetDateTime;
use validator::Validate;

use super::price::Price;
use crate::error::Violation;
use crate::validation::{self, NOT_BLANK, NOT_NULL};

pub const NAME_TAKEN: &str = "This Product is already exists";

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Product {
    pub id: Option<i64>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    #[validate(length(min = 3, max = 255))]
    pub name: String,
    #[validate(length(min = 3, max = 5000))]
    pub description: String,
    pub price: Option<Price>,
    #[validate(length(max = 255))]
    pub size: Option<String>,
    #[validate(length(max = 255))]
    pub composition: Option<String>,
    #[validate(length(max = 255))]
    pub manufacturer: Option<String>,
    pub category_id: Option<i64>,
    /// Visible to and writable by administrators only.
    #[validate(length(max = 5000))]
    pub description_internal: Option<String>,
}

impl Product {
    pub fn new() -> Self {
        Self {
            id: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            name: String::new(),
            description: String::new(),
            price: None,
            size: None,
            composition: None,
            manufacturer: None,
            category_id: None,
            description_internal: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn set_price(&mut self, price: Option<Price>) -> &mut Self {
        self.price = price;
        self
    }

    pub fn set_size(&mut self, size: Option<String>) -> &mut Self {
        self.size = size;
        self
    }

    pub fn set_composition(&mut self, composition: Option<String>) -> &mut Self {
        self.composition = composition;
        self
    }

    pub fn set_manufacturer(&mut self, manufacturer: Option<String>) -> &mut Self {
        self.manufacturer = manufacturer;
        self
    }

    pub fn set_category(&mut self, category_id: Option<i64>) -> &mut Self {
        self.category_id = category_id;
        self
    }

    pub fn set_description_internal(&mut self, text: Option<String>) -> &mut Self {
        self.description_internal = text;
        self
    }

    pub fn touch(&mut self) -> &mut Self {
        self.updated_at = Some(OffsetDateTime::now_utc());
        self
    }

    /// Field rules that need no database access.
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = validation::derived(self);
        validation::not_blank("name", &self.name, &mut out);
        validation::not_blank("description", &self.description, &mut out);
        match &self.price {
            None => out.push(Violation::new("price", NOT_BLANK)),
            Some(price) => out.extend(
                price
                    .violations()
                    .into_iter()
                    .map(|msg| Violation::new("price", msg)),
            ),
        }
        if self.category_id.is_none() {
            out.push(Violation::new("category", NOT_NULL));
        }
        out
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sneaker() -> Product {
        let mut p = Product::new();
        p.set_name("Sneaker")
            .set_description("abc")
            .set_price(Some("19.99".parse().unwrap()))
            .set_category(Some(1));
        p
    }

    fn fields(p: &Product) -> Vec<String> {
        p.violations().into_iter().map(|v| v.property_path).collect()
    }

    #[test]
    fn minimal_product_is_valid() {
        assert!(sneaker().violations().is_empty());
    }

    #[test]
    fn empty_product_reports_every_required_field() {
        let f = fields(&Product::new());
        for field in ["name", "description", "price", "category"] {
            assert!(f.iter().any(|x| x == field), "missing {field}");
        }
    }

    #[test]
    fn optional_texts_are_bounded() {
        let mut p = sneaker();
        p.set_size(Some("x".repeat(256)))
            .set_composition(Some("x".repeat(255)))
            .set_description_internal(Some("x".repeat(5001)));
        let mut f = fields(&p);
        f.sort();
        assert_eq!(f, vec!["descriptionInternal", "size"]);
    }

    #[test]
    fn description_length_is_bounded() {
        let mut p = sneaker();
        assert!(!p.set_description("ab").violations().is_empty());
        assert!(p.set_description("x".repeat(5000)).violations().is_empty());
        assert!(!p.set_description("x".repeat(5001)).violations().is_empty());
    }

    #[test]
    fn negative_price_is_reported_on_price() {
        let mut p = sneaker();
        p.set_price(Some("-1.00".parse().unwrap()));
        assert_eq!(fields(&p), vec!["price".to_string()]);
    }
}
