use serde::{de, Deserialize, Deserializer, Serialize};
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

/// Input of the search operation.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(deserialize_with = "timestamp")]
    pub from: OffsetDateTime,
    #[serde(deserialize_with = "timestamp")]
    pub to: OffsetDateTime,
}

/// Output of the search operation; the three lists are independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub flights: Vec<String>,
    pub airports: Vec<String>,
    pub cities: Vec<String>,
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(raw.trim())
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn accepts_dates_and_rfc3339() {
        assert_eq!(parse_timestamp("2024-01-01"), Some(datetime!(2024-01-01 0:00 UTC)));
        assert_eq!(
            parse_timestamp("2024-01-31T10:15:00+02:00"),
            Some(datetime!(2024-01-31 10:15 +2))
        );
        assert_eq!(parse_timestamp("31/01/2024"), None);
    }

    #[test]
    fn request_requires_both_bounds() {
        assert!(serde_json::from_str::<SearchRequest>(r#"{"from":"2024-01-01"}"#).is_err());
        let req: SearchRequest =
            serde_json::from_str(r#"{"from":"2024-01-01","to":"2024-01-31"}"#).unwrap();
        assert!(req.from < req.to);
    }
}
