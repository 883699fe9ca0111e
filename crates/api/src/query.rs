//! Query-string parsing for the catalog listing.
//!
//! The listing accepts repeated keys (`tag=a&tag=b`), so handlers extract
//! the raw pairs with `Query<Vec<(String, String)>>` and convert them here.

use gallery_core::pagination::PageRequest;
use gallery_core::query::{AssetFilters, AssetOrder};

/// Parsed `GET /assets` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAssetsParams {
    pub filters: AssetFilters,
    pub order: AssetOrder,
    pub page: PageRequest,
}

impl ListAssetsParams {
    /// Build listing parameters from raw query pairs.
    ///
    /// Tags accumulate across `tag` and `tag[]`. Other filters take their
    /// first occurrence. Unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let tags = pairs
            .iter()
            .filter(|(k, _)| k == "tag" || k == "tag[]")
            .map(|(_, v)| v.clone())
            .collect();

        let first = |keys: &[&str]| first_value(pairs, keys);
        let curated = first(&["curated"]).is_some_and(|v| is_truthy(&v));

        let filters = AssetFilters {
            tags,
            curated,
            name: first(&["name"]),
            description: first(&["description"]),
            owner_name: first(&["ownername"]),
            format: first(&["format"]),
            category: first(&["category"]),
            keywords: first(&["keywords"]),
        };

        let order = AssetOrder::parse(first(&["orderBy", "order_by"]).as_deref());
        let page = PageRequest::parse_candidates(
            &all_values(pairs, &["pageSize", "page_size"]),
            &all_values(pairs, &["pageToken", "page_token"]),
        );

        Self {
            filters,
            order,
            page,
        }
    }
}

fn first_value(pairs: &[(String, String)], keys: &[&str]) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| keys.contains(&k.as_str()))
        .map(|(_, v)| v.clone())
}

fn all_values<'a>(pairs: &'a [(String, String)], keys: &[&str]) -> Vec<Option<&'a str>> {
    pairs
        .iter()
        .filter(|(k, _)| keys.contains(&k.as_str()))
        .map(|(_, v)| Some(v.as_str()))
        .collect()
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_query_uses_defaults() {
        let params = ListAssetsParams::from_pairs(&[]);
        assert_eq!(params.filters, AssetFilters::default());
        assert_eq!(params.order, AssetOrder::Newest);
        assert_eq!(params.page, PageRequest::default());
    }

    #[test]
    fn tags_accumulate_across_spellings() {
        let params =
            ListAssetsParams::from_pairs(&pairs(&[("tag", "sci-fi"), ("tag[]", "space")]));
        assert_eq!(params.filters.tags, vec!["sci-fi", "space"]);
    }

    #[test]
    fn curated_accepts_common_truthy_values() {
        for raw in ["true", "TRUE", "1", "yes"] {
            assert!(ListAssetsParams::from_pairs(&pairs(&[("curated", raw)])).filters.curated);
        }
        assert!(!ListAssetsParams::from_pairs(&pairs(&[("curated", "false")])).filters.curated);
        assert!(!ListAssetsParams::from_pairs(&pairs(&[("curated", "")])).filters.curated);
    }

    #[test]
    fn text_filters_and_order() {
        let params = ListAssetsParams::from_pairs(&pairs(&[
            ("name", "rocket"),
            ("ownername", "ada"),
            ("format", "GLTF2"),
            ("category", "technology"),
            ("keywords", "red ship"),
            ("order_by", "best"),
        ]));
        assert_eq!(params.filters.name.as_deref(), Some("rocket"));
        assert_eq!(params.filters.owner_name.as_deref(), Some("ada"));
        assert_eq!(params.filters.format.as_deref(), Some("GLTF2"));
        assert_eq!(params.filters.category.as_deref(), Some("technology"));
        assert_eq!(params.filters.keywords.as_deref(), Some("red ship"));
        assert_eq!(params.order, AssetOrder::Best);
    }

    #[test]
    fn pagination_accepts_both_spellings() {
        let params =
            ListAssetsParams::from_pairs(&pairs(&[("page_size", "10"), ("pageToken", "3")]));
        assert_eq!(params.page.page_size, 10);
        assert_eq!(params.page.page_token, 3);
    }

    #[test]
    fn malformed_pagination_falls_back() {
        let params =
            ListAssetsParams::from_pairs(&pairs(&[("pageSize", "lots"), ("pageToken", "-1")]));
        assert_eq!(params.page, PageRequest::default());
    }
}
