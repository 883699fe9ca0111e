//! Repository for the `assets` table.
//!
//! Listing renders an [`AssetPredicate`] into a parameterised WHERE clause.
//! Counter updates (views, likes) and rank are written with a single
//! expression evaluated by PostgreSQL so concurrent requests never lose
//! increments.

use gallery_core::catalog::Visibility;
use gallery_core::derived::{compute_derived_fields, DerivedFields, DerivedInputs};
use gallery_core::pagination::PageRequest;
use gallery_core::query::{AssetOrder, AssetPredicate};
use gallery_core::rank::{LIKES_WEIGHT, MIN_AGE_SECS, RECENCY_WEIGHT, VIEWS_WEIGHT};
use gallery_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgExecutor, PgPool, Postgres};

use crate::models::asset::{Asset, AssetWithOwner, CreateAsset, UpdateAsset};
use crate::repositories::{FormatRepo, TagRepo};

/// Column list for `assets` queries.
const COLUMNS: &str = "\
    id, url, owner_id, name, description, visibility, curated, license, category, state, \
    likes, views, downloads, historical_likes, historical_views, rank, \
    thumbnail, thumbnail_content_type, presentation_params, \
    has_tilt, has_blocks, has_gltf1, has_gltf2, has_gltf_any, has_fbx, has_obj, \
    formats, search_text, is_viewer_compatible, created_at, updated_at";

/// Column list for `assets a JOIN users u` queries.
const OWNER_COLUMNS: &str = "\
    a.id, a.url, a.owner_id, a.name, a.description, a.visibility, a.curated, a.license, \
    a.category, a.state, a.likes, a.views, a.downloads, a.historical_likes, \
    a.historical_views, a.rank, a.thumbnail, a.thumbnail_content_type, \
    a.presentation_params, a.has_tilt, a.has_blocks, a.has_gltf1, a.has_gltf2, \
    a.has_gltf_any, a.has_fbx, a.has_obj, a.formats, a.search_text, \
    a.is_viewer_compatible, a.created_at, a.updated_at, \
    u.url AS owner_url, u.display_name AS owner_display_name";

/// Provides CRUD, listing and counter operations for assets.
pub struct AssetRepo;

impl AssetRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Insert a bare asset. Derived columns keep their defaults until the
    /// first refresh.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        url: &str,
        input: &CreateAsset,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (owner_id, url, name, description, visibility, license, category) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'PRIVATE'), $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(owner_id)
            .bind(url)
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .bind(input.visibility.map(|v| v.as_str()))
            .bind(input.license.map(|l| l.as_str()))
            .bind(input.category.map(|c| c.as_str()))
            .fetch_one(pool)
            .await
    }

    /// Find an asset by id, with its owner.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<AssetWithOwner>, sqlx::Error> {
        let query = format!(
            "SELECT {OWNER_COLUMNS} FROM assets a JOIN users u ON u.id = a.owner_id \
             WHERE a.id = $1"
        );
        sqlx::query_as::<_, AssetWithOwner>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find an asset by its owner's url and its own url.
    pub async fn find_by_urls(
        pool: &PgPool,
        owner_url: &str,
        asset_url: &str,
    ) -> Result<Option<AssetWithOwner>, sqlx::Error> {
        let query = format!(
            "SELECT {OWNER_COLUMNS} FROM assets a JOIN users u ON u.id = a.owner_id \
             WHERE u.url = $1 AND a.url = $2"
        );
        sqlx::query_as::<_, AssetWithOwner>(&query)
            .bind(owner_url)
            .bind(asset_url)
            .fetch_optional(pool)
            .await
    }

    /// Patch metadata. Only present fields are applied; `tags` replaces the
    /// whole tag set. Returns `None` if the asset does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAsset,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE assets SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                visibility = COALESCE($4, visibility), \
                license = COALESCE($5, license), \
                category = COALESCE($6, category), \
                state = COALESCE($7, state), \
                thumbnail = COALESCE($8, thumbnail), \
                thumbnail_content_type = COALESCE($9, thumbnail_content_type), \
                presentation_params = COALESCE($10, presentation_params) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .bind(input.visibility.map(|v| v.as_str()))
            .bind(input.license.map(|l| l.as_str()))
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.state.map(|s| s.as_str()))
            .bind(input.thumbnail.as_deref())
            .bind(input.thumbnail_content_type.as_deref())
            .bind(input.presentation_params.as_ref().map(sqlx::types::Json))
            .fetch_optional(&mut *tx)
            .await?;

        if asset.is_some() {
            if let Some(ref tags) = input.tags {
                TagRepo::set_for_asset(&mut tx, id, tags).await?;
            }
        }

        tx.commit().await?;
        Ok(asset)
    }

    /// Change visibility. Returns true if the asset exists.
    pub async fn set_visibility(
        pool: &PgPool,
        id: DbId,
        visibility: Visibility,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE assets SET visibility = $2 WHERE id = $1")
            .bind(id)
            .bind(visibility.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an asset, recording the stored files hidden beforehand.
    ///
    /// The log rows and the delete commit together. Returns true if the
    /// asset existed.
    pub async fn delete_with_hidden_media(
        pool: &PgPool,
        id: DbId,
        hidden_files: &[String],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !hidden_files.is_empty() {
            sqlx::query(
                "INSERT INTO hidden_media_files (original_asset_id, file_name) \
                 SELECT $1, unnest($2::text[])",
            )
            .bind(id)
            .bind(hidden_files)
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// One page of assets matching `predicate`, plus the total match count.
    pub async fn list(
        pool: &PgPool,
        predicate: &AssetPredicate,
        order: AssetOrder,
        page: &PageRequest,
    ) -> Result<(Vec<AssetWithOwner>, i64), sqlx::Error> {
        let mut binds = Vec::new();
        let where_clause = render_predicate(predicate, &mut binds);
        let limit_idx = binds.len() + 1;

        let count_query = format!(
            "SELECT COUNT(*) FROM assets a JOIN users u ON u.id = a.owner_id \
             WHERE {where_clause}"
        );
        let (total,) = bind_values(sqlx::query_as::<_, (i64,)>(&count_query), binds.clone())
            .fetch_one(pool)
            .await?;

        let list_query = format!(
            "SELECT {OWNER_COLUMNS} FROM assets a JOIN users u ON u.id = a.owner_id \
             WHERE {where_clause} \
             ORDER BY {order_by} \
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            order_by = order_clause(order),
            offset_idx = limit_idx + 1,
        );
        let assets = bind_values(sqlx::query_as::<_, AssetWithOwner>(&list_query), binds)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok((assets, total))
    }

    // -----------------------------------------------------------------------
    // Derived fields and counters
    // -----------------------------------------------------------------------

    /// Recompute and persist every derived column of an asset.
    ///
    /// Flags, format list, search text and viewer compatibility are computed
    /// in Rust from rows read under a row lock, so concurrent refreshes of one
    /// asset apply in order and the last writer has seen every committed
    /// format. Rank is written with the same SQL expression the counters use
    /// so a concurrent increment is never overwritten with a stale value.
    /// Returns `None` if the asset does not exist.
    pub async fn refresh_derived(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM assets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let Some(row) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        let formats = FormatRepo::list_for_asset(&mut *tx, id).await?;
        let tags = TagRepo::names_for_asset(&mut *tx, id).await?;

        let derived = compute_derived_fields(&DerivedInputs {
            name: row.asset.name.as_deref(),
            description: row.asset.description.as_deref(),
            owner_display_name: &row.owner_display_name,
            tags: &tags,
            formats: &formats,
        });

        tracing::debug!(asset_id = id, formats = formats.len(), "Refreshing derived fields");
        let asset = Self::write_derived(&mut *tx, id, &derived).await?;
        tx.commit().await?;
        Ok(asset)
    }

    async fn write_derived<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        derived: &DerivedFields,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET \
                has_tilt = $2, has_blocks = $3, has_gltf1 = $4, has_gltf2 = $5, \
                has_gltf_any = $6, has_fbx = $7, has_obj = $8, \
                formats = $9, search_text = $10, is_viewer_compatible = $11, \
                rank = {rank} \
             WHERE id = $1 \
             RETURNING {COLUMNS}",
            rank = rank_expression("likes", "views"),
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(derived.has_tilt)
            .bind(derived.has_blocks)
            .bind(derived.has_gltf1)
            .bind(derived.has_gltf2)
            .bind(derived.has_gltf_any)
            .bind(derived.has_fbx)
            .bind(derived.has_obj)
            .bind(sqlx::types::Json(&derived.formats))
            .bind(&derived.search_text)
            .bind(derived.is_viewer_compatible)
            .fetch_optional(executor)
            .await
    }

    /// Add one view and recompute rank in a single statement.
    ///
    /// Returns the new `(views, rank)`, or `None` if the asset does not exist.
    pub async fn increment_view_and_rank(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<(i64, f64)>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET views = views + 1, rank = {rank} \
             WHERE id = $1 \
             RETURNING views, rank",
            rank = rank_expression("likes", "(views + 1)"),
        );
        sqlx::query_as::<_, (i64, f64)>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record that `user_id` likes the asset.
    ///
    /// Idempotent: a repeated like changes nothing. A new like increments the
    /// counter and recomputes rank in the same transaction. Returns true if a
    /// new like was recorded.
    pub async fn like(pool: &PgPool, user_id: DbId, asset_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO user_asset_likes (user_id, asset_id) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_user_asset_likes_user_asset DO NOTHING",
        )
        .bind(user_id)
        .bind(asset_id)
        .execute(&mut *tx)
        .await?;
        let inserted = result.rows_affected() > 0;

        if inserted {
            let query = format!(
                "UPDATE assets SET likes = likes + 1, rank = {rank} WHERE id = $1",
                rank = rank_expression("(likes + 1)", "views"),
            );
            sqlx::query(&query).bind(asset_id).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

// ---------------------------------------------------------------------------
// SQL rendering
// ---------------------------------------------------------------------------

/// A value bound to one `$n` placeholder of a rendered predicate.
#[derive(Debug, Clone)]
enum BindValue {
    Text(String),
    TextList(Vec<String>),
    Json(serde_json::Value),
}

/// Render `predicate` as SQL over `assets a JOIN users u`, pushing its
/// parameters onto `binds` in placeholder order.
fn render_predicate(predicate: &AssetPredicate, binds: &mut Vec<BindValue>) -> String {
    match predicate {
        AssetPredicate::All(clauses) if clauses.is_empty() => "TRUE".to_string(),
        AssetPredicate::All(clauses) => {
            let rendered: Vec<String> = clauses
                .iter()
                .map(|c| render_predicate(c, binds))
                .collect();
            format!("({})", rendered.join(" AND "))
        }
        AssetPredicate::VisibilityIs(v) => format!(
            "a.visibility = {}",
            placeholder(binds, BindValue::Text(v.as_str().to_string()))
        ),
        AssetPredicate::TagsAny(names) => format!(
            "EXISTS (SELECT 1 FROM asset_tags atg JOIN tags t ON t.id = atg.tag_id \
             WHERE atg.asset_id = a.id AND t.name = ANY({}))",
            placeholder(binds, BindValue::TextList(names.clone()))
        ),
        AssetPredicate::Curated => "a.curated".to_string(),
        AssetPredicate::NameContains(s) => format!(
            "a.name ILIKE {}",
            placeholder(binds, BindValue::Text(contains_pattern(s)))
        ),
        AssetPredicate::DescriptionContains(s) => format!(
            "a.description ILIKE {}",
            placeholder(binds, BindValue::Text(contains_pattern(s)))
        ),
        AssetPredicate::OwnerNameContains(s) => format!(
            "u.display_name ILIKE {}",
            placeholder(binds, BindValue::Text(contains_pattern(s)))
        ),
        AssetPredicate::HasFormat(code) => format!(
            "a.formats @> {}",
            placeholder(binds, BindValue::Json(serde_json::json!([{ "format": code }])))
        ),
        AssetPredicate::CategoryIs(code) => format!(
            "a.category = {}",
            placeholder(binds, BindValue::Text(code.clone()))
        ),
        AssetPredicate::SearchTextContains(s) => format!(
            "a.search_text ILIKE {}",
            placeholder(binds, BindValue::Text(contains_pattern(s)))
        ),
    }
}

/// Push a parameter and return its `$n` placeholder.
fn placeholder(binds: &mut Vec<BindValue>, value: BindValue) -> String {
    binds.push(value);
    format!("${}", binds.len())
}

fn bind_values<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    binds: Vec<BindValue>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(s) => query.bind(s),
            BindValue::TextList(v) => query.bind(v),
            BindValue::Json(v) => query.bind(v),
        };
    }
    query
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn order_clause(order: AssetOrder) -> &'static str {
    match order {
        AssetOrder::Newest => "a.created_at DESC, a.id DESC",
        AssetOrder::Oldest => "a.created_at ASC, a.id ASC",
        AssetOrder::Best => "a.rank DESC, a.id DESC",
        AssetOrder::Likes => "a.likes DESC, a.id DESC",
        AssetOrder::Views => "a.views DESC, a.id DESC",
    }
}

/// Rank as a SQL expression over the row being updated. `likes` and `views`
/// name the live counters, so callers can substitute post-increment values.
fn rank_expression(likes: &str, views: &str) -> String {
    format!(
        "((({likes} + historical_likes + 1) * {LIKES_WEIGHT:?}) \
         + (({views} + historical_views) * {VIEWS_WEIGHT:?}) \
         + ((1.0 / GREATEST(EXTRACT(EPOCH FROM NOW()) - EXTRACT(EPOCH FROM created_at), \
         {MIN_AGE_SECS:?})) * {RECENCY_WEIGHT:?}))::double precision"
    )
}

#[cfg(test)]
mod tests {
    use gallery_core::config::CatalogConfig;
    use gallery_core::query::{build_asset_query, AssetFilters};

    use super::*;

    #[test]
    fn empty_conjunction_is_true() {
        let mut binds = Vec::new();
        assert_eq!(render_predicate(&AssetPredicate::All(vec![]), &mut binds), "TRUE");
        assert!(binds.is_empty());
    }

    #[test]
    fn placeholders_follow_bind_order() {
        let filters = AssetFilters {
            tags: vec!["sci-fi".into()],
            curated: true,
            name: Some("rock".into()),
            ..Default::default()
        };
        let predicate = build_asset_query(&filters, &CatalogConfig::new("https://cdn"));
        let mut binds = Vec::new();
        let sql = render_predicate(&predicate, &mut binds);

        assert!(sql.starts_with("(a.visibility = $1 AND EXISTS"));
        assert!(sql.contains("ANY($2)"));
        assert!(sql.contains("a.curated"));
        assert!(sql.ends_with("a.name ILIKE $3)"));
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn rank_expression_substitutes_counters() {
        let sql = rank_expression("likes", "(views + 1)");
        assert!(sql.contains("((views + 1) + historical_views) * 0.1"));
        assert!(sql.contains("(likes + historical_likes + 1) * 100.0"));
        assert!(sql.contains("GREATEST("));
    }
}

