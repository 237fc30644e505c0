//! Pagination and date-range query parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MIN_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=&page_size=` query parameters.
///
/// Numbers go through `DisplayFromStr` so the struct also works when
/// flattened into another query type.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    /// Validated `(page, page_size)`, defaulting to page 1 of 20.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page` is 0 or `page_size` is
    /// outside 10..=100.
    pub fn resolve(&self) -> Result<(i64, i64), AppError> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "page": page }),
            ));
        }

        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::bad_request(
                format!("Page size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"),
                json!({ "page_size": page_size }),
            ));
        }

        Ok((i64::from(page), i64::from(page_size)))
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(page: i64, page_size: i64, total_items: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_items + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

/// One page of results.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub pagination: PaginationMeta,
    pub items: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: i64, page_size: i64, total_items: i64) -> Self {
        Self {
            pagination: PaginationMeta::new(page, page_size, total_items),
            items,
        }
    }
}

/// Half-open `[from, to)` range given as RFC 3339 timestamps.
#[derive(Debug, Default, Deserialize)]
pub struct DateFilterParams {
    #[serde(default, with = "optional_rfc3339")]
    pub from: Option<DateTime<Utc>>,

    #[serde(default, with = "optional_rfc3339")]
    pub to: Option<DateTime<Utc>>,
}

impl DateFilterParams {
    /// Both bounds or neither.
    pub fn both_or_none(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, AppError> {
        match (self.from, self.to) {
            (None, None) => Ok(None),
            (Some(from), Some(to)) => Ok(Some((from, to))),
            _ => Err(AppError::bad_request(
                "Both 'from' and 'to' must be given",
                json!({ "from": self.from, "to": self.to }),
            )),
        }
    }
}

mod optional_rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, page_size: Option<u32>) -> PaginationParams {
        PaginationParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(params(None, None).resolve().unwrap(), (1, 20));
    }

    #[test]
    fn test_custom_page_and_size() {
        assert_eq!(params(Some(3), Some(50)).resolve().unwrap(), (3, 50));
    }

    #[test]
    fn test_page_zero_is_error() {
        assert!(params(Some(0), None).resolve().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(params(None, Some(9)).resolve().is_err());
        assert!(params(None, Some(10)).resolve().is_ok());
        assert!(params(None, Some(100)).resolve().is_ok());
        assert!(params(None, Some(101)).resolve().is_err());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PaginationMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(1, 10, 11).total_pages, 2);
    }

    #[test]
    fn test_optional_rfc3339_deserializer() {
        let json = r#"{"from": "2026-01-01T00:00:00Z", "to": null}"#;
        let p: DateFilterParams = serde_json::from_str(json).unwrap();
        assert!(p.from.is_some());
        assert!(p.to.is_none());
        assert!(p.both_or_none().is_err());
    }

    #[test]
    fn test_optional_rfc3339_invalid_format_is_error() {
        let json = r#"{"from": "yesterday"}"#;
        assert!(serde_json::from_str::<DateFilterParams>(json).is_err());
    }

    #[test]
    fn test_both_or_none() {
        assert!(DateFilterParams::default().both_or_none().unwrap().is_none());

        let json = r#"{"from": "2026-01-01T00:00:00Z", "to": "2026-02-01T00:00:00Z"}"#;
        let p: DateFilterParams = serde_json::from_str(json).unwrap();
        assert!(p.both_or_none().unwrap().is_some());
    }
}
