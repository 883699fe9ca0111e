//! Page-token pagination for catalog listings.
//!
//! Tokens are 1-based page numbers rendered as strings. Malformed values
//! never fail a request; they fall back to the defaults.

use serde::Serialize;

/// Default number of assets per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard ceiling on the page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page returned when no usable token is supplied.
pub const DEFAULT_PAGE_TOKEN: i64 = 1;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: i64,
    pub page_token: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_token: DEFAULT_PAGE_TOKEN,
        }
    }
}

impl PageRequest {
    /// Build a request from raw query-string values.
    ///
    /// Missing, empty, non-numeric and non-positive values fall back to the
    /// defaults. The page size is capped at [`MAX_PAGE_SIZE`].
    pub fn parse(page_size: Option<&str>, page_token: Option<&str>) -> Self {
        let page_size = parse_positive(page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let page_token = parse_positive(page_token).unwrap_or(DEFAULT_PAGE_TOKEN);
        Self {
            page_size,
            page_token,
        }
    }

    /// Like [`PageRequest::parse`] when each value may arrive under several
    /// parameter names. The first usable candidate of each list wins.
    pub fn parse_candidates(page_sizes: &[Option<&str>], page_tokens: &[Option<&str>]) -> Self {
        Self::parse(first_usable(page_sizes), first_usable(page_tokens))
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page_token - 1).saturating_mul(self.page_size)
    }

    /// Number of rows to fetch.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Token of the following page, if rows remain past this page.
    pub fn next_token(&self, total_size: i64) -> Option<String> {
        let end = self.offset().saturating_add(self.page_size);
        (end < total_size).then(|| self.page_token.saturating_add(1).to_string())
    }

    /// Wrap one page of items with the listing metadata.
    pub fn paginate<T>(&self, assets: Vec<T>, total_size: i64) -> Page<T> {
        Page {
            assets,
            total_size,
            next_page_token: self.next_token(total_size),
        }
    }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub assets: Vec<T>,
    pub total_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
}

fn first_usable<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|raw| parse_positive(*raw).is_some())
        .flatten()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        let page = PageRequest::parse(None, None);
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn malformed_values_fall_back() {
        assert_eq!(PageRequest::parse(Some(""), Some("")), PageRequest::default());
        assert_eq!(PageRequest::parse(Some("abc"), Some("x2")), PageRequest::default());
        assert_eq!(PageRequest::parse(Some("0"), Some("-3")), PageRequest::default());
        assert_eq!(PageRequest::parse(Some("1.5"), None), PageRequest::default());
    }

    #[test]
    fn page_size_is_capped() {
        assert_eq!(PageRequest::parse(Some("500"), None).page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::parse(Some("100"), None).page_size, 100);
        assert_eq!(PageRequest::parse(Some(" 7 "), None).page_size, 7);
    }

    #[test]
    fn second_page_of_45() {
        let page = PageRequest::parse(None, Some("2"));
        assert_eq!(page.offset(), 20);
        assert_eq!(page.next_token(45), Some("3".to_string()));
    }

    #[test]
    fn last_page_has_no_next_token() {
        let page = PageRequest::parse(None, Some("3"));
        assert_eq!(page.offset(), 40);
        assert_eq!(page.next_token(45), None);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let page = PageRequest::parse(Some("10"), Some("2"));
        assert_eq!(page.next_token(20), None);
        assert_eq!(page.next_token(21), Some("3".to_string()));
    }

    #[test]
    fn first_usable_candidate_wins() {
        let page = PageRequest::parse_candidates(&[Some("junk"), Some("5")], &[None, Some("2")]);
        assert_eq!(page.page_size, 5);
        assert_eq!(page.page_token, 2);

        let page = PageRequest::parse_candidates(&[Some("7"), Some("5")], &[Some("0"), None]);
        assert_eq!(page.page_size, 7);
        assert_eq!(page.page_token, DEFAULT_PAGE_TOKEN);
    }

    #[test]
    fn empty_result_set() {
        let page = PageRequest::default().paginate(Vec::<u8>::new(), 0);
        assert_eq!(page.total_size, 0);
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn page_serializes_with_catalog_field_names() {
        let page = PageRequest::default().paginate(vec![1, 2], 2);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({"assets": [1, 2], "totalSize": 2}));

        let page = PageRequest::parse(Some("1"), None).paginate(vec![1], 2);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["nextPageToken"], "2");
    }
}
