use serde::Deserialize;

use crate::error::AppError;

pub const ITEMS_PER_PAGE: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        ITEMS_PER_PAGE
    }

    /// Pages start at 1; anything lower is treated as the first page. A page
    /// whose offset does not fit an `i64` is a violation on `page`.
    pub fn offset(&self) -> Result<i64, AppError> {
        (self.page.max(1) - 1)
            .checked_mul(ITEMS_PER_PAGE)
            .ok_or_else(|| AppError::invalid("page", "This value is too large."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_counts_from_first_page() {
        assert_eq!(Pagination { page: 1 }.offset().unwrap(), 0);
        assert_eq!(Pagination { page: 3 }.offset().unwrap(), 60);
        assert_eq!(Pagination { page: -4 }.offset().unwrap(), 0);
    }

    #[test]
    fn huge_page_is_a_violation() {
        let page: Pagination = serde_json::from_str(r#"{"page":9223372036854775807}"#).unwrap();
        match page.offset().unwrap_err() {
            AppError::Validation(v) => assert_eq!(v[0].property_path, "page"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
