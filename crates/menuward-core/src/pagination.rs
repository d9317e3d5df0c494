//! Pagination utilities for list endpoints.
//!
//! Supports offset-based (`limit` + `offset`) and page-based (`limit` + `page`)
//! windows. When `page` is provided it takes precedence over `offset`.
//!
//! # Example
//!
//! ```ignore
//! use menuward_core::pagination::{PaginationMeta, PaginationParams};
//!
//! let params = PaginationParams { limit: Some(20), offset: None, page: Some(3) };
//! let (roles, total) = store.list_roles(&filter, params.limit(), params.offset()).await?;
//! let meta = PaginationMeta::for_window(total, roles.len(), &params);
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// Query strings may carry empty values (`?limit=`), which count as absent.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata returned next to a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// The limit that was applied
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    /// Builds the metadata for a window of `returned` items out of `total`.
    pub fn for_window(total: i64, returned: usize, params: &PaginationParams) -> Self {
        let offset = params.offset();
        Self {
            total,
            limit: params.limit(),
            offset: Some(offset),
            page: params.page(),
            has_more: offset.saturating_add(returned as i64) < total,
        }
    }
}

/// Query parameters for pagination.
///
/// - `limit` is clamped to `[1, 100]`
/// - `offset` is clamped to a minimum of 0
/// - `page` is clamped to a minimum of 1
#[derive(Debug, Clone, Hash, Deserialize)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            offset: Some(0),
            page: None,
        }
    }
}

impl PaginationParams {
    /// Returns the effective limit, clamped to `[1, 100]`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Returns the effective offset, derived from `page` when present.
    #[must_use]
    pub fn offset(&self) -> i64 {
        if let Some(page) = self.page {
            (page.max(1) - 1).saturating_mul(self.limit())
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_default() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.page(), None);
    }

    #[test]
    fn test_pagination_params_limit_boundary_cases() {
        let test_cases = vec![
            (Some(1), 1),
            (Some(50), 50),
            (Some(100), 100),
            (Some(101), 100),
            (Some(0), 1),
            (Some(-1), 1),
            (None, 10),
        ];

        for (input, expected) in test_cases {
            let params = PaginationParams {
                limit: input,
                offset: Some(0),
                page: None,
            };
            assert_eq!(params.limit(), expected);
        }
    }

    #[test]
    fn test_pagination_params_page_takes_precedence() {
        let params = PaginationParams {
            limit: Some(20),
            offset: Some(5),
            page: Some(3),
        };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.page(), Some(3));
    }

    #[test]
    fn test_pagination_params_negative_offset() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(-5),
            page: None,
        };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_params_deserialize_empty_strings() {
        let json = r#"{"limit":"","offset":""}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_params_deserialize_with_values() {
        let json = r#"{"limit":"25","page":"2"}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 25);
    }

    #[test]
    fn test_pagination_meta_for_window() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(20),
            page: None,
        };
        let meta = PaginationMeta::for_window(35, 10, &params);
        assert_eq!(meta.offset, Some(20));
        assert!(meta.has_more);

        let last = PaginationMeta::for_window(30, 10, &params);
        assert!(!last.has_more);
    }

    #[test]
    fn test_pagination_huge_page_saturates() {
        let params = PaginationParams {
            limit: Some(100),
            offset: None,
            page: Some(i64::MAX),
        };
        assert_eq!(params.offset(), i64::MAX);
        assert_eq!(params.page(), Some(i64::MAX));

        let meta = PaginationMeta::for_window(5, 0, &params);
        assert_eq!(meta.offset, Some(i64::MAX));
        assert!(!meta.has_more);
    }

    #[test]
    fn test_pagination_huge_offset_does_not_overflow() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(i64::MAX),
            page: None,
        };
        let meta = PaginationMeta::for_window(i64::MAX, 10, &params);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_pagination_meta_serialize_skips_page() {
        let meta = PaginationMeta::for_window(3, 3, &PaginationParams::default());
        let serialized = serde_json::to_string(&meta).unwrap();
        assert!(serialized.contains(r#""total":3"#));
        assert!(serialized.contains(r#""has_more":false"#));
        assert!(!serialized.contains("page"));
    }
}
