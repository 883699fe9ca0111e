//! Catalog query composition.
//!
//! [`build_asset_query`] turns listing filters into an [`AssetPredicate`], a
//! plain value tree that the repository layer renders to SQL.

use crate::catalog::Visibility;
use crate::config::CatalogConfig;

/// Filters accepted by the catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilters {
    /// Match assets carrying any of these tag names.
    pub tags: Vec<String>,
    pub curated: bool,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Substring of the owner's display name.
    pub owner_name: Option<String>,
    /// Format code, e.g. `GLTF2`.
    pub format: Option<String>,
    pub category: Option<String>,
    /// Whitespace-separated terms, each matched against the search text.
    pub keywords: Option<String>,
}

/// A composable filter over assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPredicate {
    /// Every clause must hold. An empty list matches everything.
    All(Vec<AssetPredicate>),
    VisibilityIs(Visibility),
    /// The asset's tag set intersects these names.
    TagsAny(Vec<String>),
    Curated,
    /// Case-insensitive substring match on the display name.
    NameContains(String),
    /// Case-insensitive substring match on the description.
    DescriptionContains(String),
    /// Case-insensitive substring match on the owner's display name.
    OwnerNameContains(String),
    /// The denormalized format list contains an entry with this code.
    HasFormat(String),
    CategoryIs(String),
    /// Case-insensitive substring match on the denormalized search text.
    SearchTextContains(String),
}

/// Compose listing filters into one predicate.
///
/// Public visibility is always required. Blank filter values are ignored.
pub fn build_asset_query(filters: &AssetFilters, config: &CatalogConfig) -> AssetPredicate {
    let mut clauses = vec![AssetPredicate::VisibilityIs(Visibility::Public)];

    let tags: Vec<String> = filters
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if !tags.is_empty() {
        clauses.push(AssetPredicate::TagsAny(tags));
    }
    if filters.curated {
        clauses.push(AssetPredicate::Curated);
    }
    if let Some(name) = present(&filters.name) {
        clauses.push(AssetPredicate::NameContains(name.to_string()));
    }
    if let Some(description) = present(&filters.description) {
        clauses.push(AssetPredicate::DescriptionContains(description.to_string()));
    }
    if let Some(owner) = present(&filters.owner_name) {
        clauses.push(AssetPredicate::OwnerNameContains(owner.to_string()));
    }
    if let Some(format) = present(&filters.format) {
        clauses.push(AssetPredicate::HasFormat(format.to_string()));
    }
    if let Some(category) = present(&filters.category) {
        clauses.push(AssetPredicate::CategoryIs(config.canonical_category(category)));
    }
    if let Some(keywords) = present(&filters.keywords) {
        clauses.extend(
            keywords
                .split_whitespace()
                .map(|term| AssetPredicate::SearchTextContains(term.to_string())),
        );
    }

    AssetPredicate::All(clauses)
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Sort order of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssetOrder {
    #[default]
    Newest,
    Oldest,
    /// Highest rank first.
    Best,
    Likes,
    Views,
}

impl AssetOrder {
    /// Parse an `orderBy` value. Unknown values fall back to [`AssetOrder::Newest`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("OLDEST") => AssetOrder::Oldest,
            Some("BEST") => AssetOrder::Best,
            Some("LIKES") | Some("LIKED_TIME") => AssetOrder::Likes,
            Some("VIEWS") => AssetOrder::Views,
            _ => AssetOrder::Newest,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// The asset attributes a predicate can inspect.
    #[derive(Debug, Clone, Default)]
    struct AssetFacts {
        visibility: Visibility,
        curated: bool,
        name: Option<String>,
        description: Option<String>,
        owner_name: Option<String>,
        tags: Vec<String>,
        format_types: Vec<String>,
        category: Option<String>,
        search_text: Option<String>,
    }

    /// In-memory evaluation with the semantics the SQL rendering must match.
    impl AssetPredicate {
        fn matches(&self, asset: &AssetFacts) -> bool {
            match self {
                AssetPredicate::All(clauses) => clauses.iter().all(|c| c.matches(asset)),
                AssetPredicate::VisibilityIs(v) => asset.visibility == *v,
                AssetPredicate::TagsAny(names) => asset.tags.iter().any(|t| names.contains(t)),
                AssetPredicate::Curated => asset.curated,
                AssetPredicate::NameContains(needle) => contains_ci(asset.name.as_deref(), needle),
                AssetPredicate::DescriptionContains(needle) => {
                    contains_ci(asset.description.as_deref(), needle)
                }
                AssetPredicate::OwnerNameContains(needle) => {
                    contains_ci(asset.owner_name.as_deref(), needle)
                }
                AssetPredicate::HasFormat(code) => asset.format_types.iter().any(|f| f == code),
                AssetPredicate::CategoryIs(code) => {
                    asset.category.as_deref() == Some(code.as_str())
                }
                AssetPredicate::SearchTextContains(needle) => {
                    contains_ci(asset.search_text.as_deref(), needle)
                }
            }
        }
    }

    fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
        haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
    }

    fn config() -> CatalogConfig {
        CatalogConfig::new("https://cdn.example.com")
    }

    fn asset(name: &str, visibility: Visibility, curated: bool, tags: &[&str]) -> AssetFacts {
        AssetFacts {
            visibility,
            curated,
            name: Some(name.to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_filters_require_public_only() {
        let q = build_asset_query(&AssetFilters::default(), &config());
        assert_eq!(q, AssetPredicate::All(vec![AssetPredicate::VisibilityIs(Visibility::Public)]));
    }

    #[test]
    fn blank_values_are_ignored() {
        let filters = AssetFilters {
            name: Some("  ".into()),
            tags: vec!["".into()],
            keywords: Some(" ".into()),
            ..Default::default()
        };
        let q = build_asset_query(&filters, &config());
        assert_eq!(q, AssetPredicate::All(vec![AssetPredicate::VisibilityIs(Visibility::Public)]));
    }

    #[test]
    fn tag_and_curated_filter() {
        let filters = AssetFilters {
            tags: vec!["sci-fi".into()],
            curated: true,
            ..Default::default()
        };
        let q = build_asset_query(&filters, &config());

        let candidates = vec![
            asset("ship", Visibility::Public, true, &["sci-fi", "space"]),
            asset("robot", Visibility::Public, false, &["sci-fi"]),
            asset("secret", Visibility::Private, true, &["sci-fi"]),
            asset("tree", Visibility::Public, true, &["nature"]),
            asset("link", Visibility::Unlisted, true, &["sci-fi"]),
        ];
        let hits: Vec<_> = candidates
            .iter()
            .filter(|a| q.matches(a))
            .map(|a| a.name.clone().unwrap())
            .collect();
        assert_eq!(hits, vec!["ship".to_string()]);
    }

    #[test]
    fn multiple_matching_tags_match_once() {
        let filters = AssetFilters {
            tags: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        let q = build_asset_query(&filters, &config());
        let candidates = vec![asset("x", Visibility::Public, false, &["a", "b"])];
        assert_eq!(candidates.iter().filter(|a| q.matches(a)).count(), 1);
    }

    #[test]
    fn text_filters_are_case_insensitive() {
        let filters = AssetFilters {
            name: Some("ROCK".into()),
            owner_name: Some("ada".into()),
            ..Default::default()
        };
        let q = build_asset_query(&filters, &config());
        let mut hit = asset("Big Rocket", Visibility::Public, false, &[]);
        hit.owner_name = Some("Ada Lovelace".into());
        let mut miss = asset("Rocket", Visibility::Public, false, &[]);
        miss.owner_name = Some("Grace".into());
        assert!(q.matches(&hit));
        assert!(!q.matches(&miss));
    }

    #[test]
    fn format_filter_checks_format_list() {
        let filters = AssetFilters {
            format: Some("GLTF2".into()),
            ..Default::default()
        };
        let q = build_asset_query(&filters, &config());
        let mut with = asset("a", Visibility::Public, false, &[]);
        with.format_types = vec!["OBJ".into(), "GLTF2".into()];
        let mut without = asset("b", Visibility::Public, false, &[]);
        without.format_types = vec!["GLTF".into()];
        assert!(q.matches(&with));
        assert!(!q.matches(&without));
    }

    #[test]
    fn category_alias_is_canonicalized() {
        let filters = AssetFilters {
            category: Some("technology".into()),
            ..Default::default()
        };
        let q = build_asset_query(&filters, &config());
        assert_eq!(
            q,
            AssetPredicate::All(vec![
                AssetPredicate::VisibilityIs(Visibility::Public),
                AssetPredicate::CategoryIs("TECH".into()),
            ])
        );
    }

    #[test]
    fn keywords_split_into_terms() {
        let filters = AssetFilters {
            keywords: Some("red  car".into()),
            ..Default::default()
        };
        let q = build_asset_query(&filters, &config());
        let mut hit = asset("x", Visibility::Public, false, &[]);
        hit.search_text = Some("A Red sports Car by Bob".into());
        let mut miss = asset("y", Visibility::Public, false, &[]);
        miss.search_text = Some("red bike".into());
        assert!(q.matches(&hit));
        assert!(!q.matches(&miss));
    }

    #[test]
    fn order_parsing() {
        assert_eq!(AssetOrder::parse(None), AssetOrder::Newest);
        assert_eq!(AssetOrder::parse(Some("best")), AssetOrder::Best);
        assert_eq!(AssetOrder::parse(Some("OLDEST")), AssetOrder::Oldest);
        assert_eq!(AssetOrder::parse(Some("bogus")), AssetOrder::Newest);
    }
}
