use tracing::debug;

use super::dto::{SearchRequest, SearchResult};
use crate::error::AppError;

/// Handles a search request. The result is placeholder content; only the
/// shape of input and output is meaningful.
pub fn process(request: &SearchRequest) -> Result<SearchResult, AppError> {
    if request.from > request.to {
        return Err(AppError::invalid(
            "to",
            "This value should be greater than or equal to \"from\".",
        ));
    }
    debug!(from = %request.from, to = %request.to, "search processed");

    Ok(SearchResult {
        flights: vec!["a lot of json data flights".to_string()],
        airports: vec!["a lot of json data airports".to_string()],
        cities: vec!["a lot of json data cities".to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn january_search_returns_three_lists() {
        let result = process(&SearchRequest {
            from: datetime!(2024-01-01 0:00 UTC),
            to: datetime!(2024-01-31 0:00 UTC),
        })
        .unwrap();
        assert!(!result.flights.is_empty());
        assert!(!result.airports.is_empty());
        assert!(!result.cities.is_empty());
    }

    #[test]
    fn single_instant_range_is_allowed() {
        let at = datetime!(2024-06-01 12:00 UTC);
        assert!(process(&SearchRequest { from: at, to: at }).is_ok());
    }

    #[test]
    fn reversed_range_is_rejected_on_to() {
        let err = process(&SearchRequest {
            from: datetime!(2024-02-01 0:00 UTC),
            to: datetime!(2024-01-01 0:00 UTC),
        })
        .unwrap_err();
        match err {
            AppError::Validation(v) => assert_eq!(v[0].property_path, "to"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
