//! Resource identifiers exchanged between resources, e.g. `/api/categories/3`.

use serde::Deserialize;

pub const API_PREFIX: &str = "/api";

pub fn category_iri(id: i64) -> String {
    format!("{API_PREFIX}/categories/{id}")
}

pub fn product_iri(id: i64) -> String {
    format!("{API_PREFIX}/products/{id}")
}

/// A reference to another resource as submitted by a client: either an IRI
/// or the bare numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    Id(i64),
    Iri(String),
}

impl ResourceRef {
    /// Resolves to an id when the IRI points into `collection`
    /// (e.g. `"categories"`).
    pub fn id_in(&self, collection: &str) -> Option<i64> {
        match self {
            ResourceRef::Id(id) => Some(*id),
            ResourceRef::Iri(iri) => iri
                .strip_prefix(API_PREFIX)?
                .strip_prefix('/')?
                .strip_prefix(collection)?
                .strip_prefix('/')?
                .parse()
                .ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ids_and_matching_iris() {
        let by_id: ResourceRef = serde_json::from_str("7").unwrap();
        assert_eq!(by_id.id_in("categories"), Some(7));

        let by_iri: ResourceRef = serde_json::from_str(r#""/api/categories/12""#).unwrap();
        assert_eq!(by_iri.id_in("categories"), Some(12));
        assert_eq!(ResourceRef::Iri(category_iri(12)).id_in("categories"), Some(12));
    }

    #[test]
    fn rejects_iris_of_other_collections() {
        assert_eq!(
            ResourceRef::Iri(product_iri(4)).id_in("categories"),
            None
        );
        assert_eq!(
            ResourceRef::Iri("/api/categories/abc".into()).id_in("categories"),
            None
        );
        assert_eq!(
            ResourceRef::Iri("/api/categories-old/1".into()).id_in("categories"),
            None
        );
    }
}
