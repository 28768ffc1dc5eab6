use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::entity::Product;
use super::price::Price;
use crate::iri::{category_iri, ResourceRef};

/// Read view of a product. `description_internal` is filled only for
/// callers allowed to see it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRead {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub name: String,
    pub description: String,
    pub price: Option<Price>,
    pub size: Option<String>,
    pub composition: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_internal: Option<String>,
}

impl ProductRead {
    pub fn view(product: &Product, show_internal: bool) -> Self {
        Self {
            id: product.id.unwrap_or_default(),
            created_at: product.created_at,
            updated_at: product.updated_at,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            size: product.size.clone(),
            composition: product.composition.clone(),
            manufacturer: product.manufacturer.clone(),
            category: product.category_id.map(category_iri),
            description_internal: if show_internal {
                product.description_internal.clone()
            } else {
                None
            },
        }
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Write view of a product.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    #[serde(default, deserialize_with = "nullable")]
    pub size: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub composition: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub manufacturer: Option<Option<String>>,
    pub category: Option<ResourceRef>,
    #[serde(default, deserialize_with = "nullable")]
    pub description_internal: Option<Option<String>>,
}

impl ProductInput {
    /// Drops `descriptionInternal` for callers who may not write it.
    pub fn restrict(mut self, may_write_internal: bool) -> Self {
        if !may_write_internal {
            self.description_internal = None;
        }
        self
    }

    pub fn touches_internal(&self) -> bool {
        self.description_internal.is_some()
    }

    pub fn category_ref(&self) -> Option<&ResourceRef> {
        self.category.as_ref()
    }

    /// POST / PUT: every writable field is taken from the input; absent
    /// optional fields become null. The category is resolved by the caller.
    pub fn replace(self, product: &mut Product, category_id: Option<i64>) {
        product
            .set_name(self.name.unwrap_or_default())
            .set_description(self.description.unwrap_or_default())
            .set_price(self.price)
            .set_size(self.size.flatten())
            .set_composition(self.composition.flatten())
            .set_manufacturer(self.manufacturer.flatten())
            .set_category(category_id);
        if let Some(text) = self.description_internal {
            product.set_description_internal(text);
        }
    }

    /// PATCH: only submitted fields change.
    pub fn merge(self, product: &mut Product, category_id: Option<i64>) {
        if let Some(name) = self.name {
            product.set_name(name);
        }
        if let Some(description) = self.description {
            product.set_description(description);
        }
        if let Some(price) = self.price {
            product.set_price(Some(price));
        }
        if let Some(size) = self.size {
            product.set_size(size);
        }
        if let Some(composition) = self.composition {
            product.set_composition(composition);
        }
        if let Some(manufacturer) = self.manufacturer {
            product.set_manufacturer(manufacturer);
        }
        if self.category.is_some() {
            product.set_category(category_id);
        }
        if let Some(text) = self.description_internal {
            product.set_description_internal(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Product {
        let mut p = Product::new();
        p.id = Some(3);
        p.set_name("Sneaker")
            .set_description("abc")
            .set_price(Some("19.99".parse().unwrap()))
            .set_size(Some("42".into()))
            .set_category(Some(1))
            .set_description_internal(Some("supplier margin 40%".into()));
        p
    }

    #[test]
    fn internal_description_hidden_from_non_admins() {
        let json = serde_json::to_value(ProductRead::view(&stored(), false)).unwrap();
        assert!(json.get("descriptionInternal").is_none());
        assert_eq!(json["price"], "19.99");
        assert_eq!(json["category"], "/api/categories/1");
    }

    #[test]
    fn internal_description_visible_to_admins() {
        let json = serde_json::to_value(ProductRead::view(&stored(), true)).unwrap();
        assert_eq!(json["descriptionInternal"], "supplier margin 40%");
    }

    #[test]
    fn restrict_drops_internal_description() {
        let input: ProductInput =
            serde_json::from_str(r#"{"descriptionInternal":"secret"}"#).unwrap();
        assert!(input.touches_internal());
        assert!(!input.restrict(false).touches_internal());
    }

    #[test]
    fn explicit_null_clears_on_patch_but_absent_keeps() {
        let mut p = stored();
        let input: ProductInput = serde_json::from_str(r#"{"composition":"cotton"}"#).unwrap();
        input.merge(&mut p, None);
        assert_eq!(p.size.as_deref(), Some("42"));
        assert_eq!(p.composition.as_deref(), Some("cotton"));
        assert_eq!(p.category_id, Some(1));

        let input: ProductInput = serde_json::from_str(r#"{"size":null}"#).unwrap();
        input.merge(&mut p, None);
        assert!(p.size.is_none());
    }

    #[test]
    fn replace_resets_absent_fields() {
        let mut p = stored();
        let input: ProductInput =
            serde_json::from_str(r#"{"name":"Boot","description":"leather","price":"5"}"#)
                .unwrap();
        input.replace(&mut p, Some(2));
        assert_eq!(p.name, "Boot");
        assert!(p.size.is_none());
        assert_eq!(p.category_id, Some(2));
        assert_eq!(p.price.unwrap().to_string(), "5.00");
        // not submitted, so left as stored
        assert_eq!(p.description_internal.as_deref(), Some("supplier margin 40%"));
    }
}
