//! Repository for the `tags` and `asset_tags` tables.

use std::collections::HashMap;

use gallery_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::tag::Tag;

/// Column list for `tags` queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides tag lookup and asset tag-set replacement.
pub struct TagRepo;

impl TagRepo {
    /// Find a tag by exact name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Tag names of one asset, alphabetically.
    pub async fn names_for_asset<'e>(
        executor: impl PgExecutor<'e>,
        asset_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT t.name FROM tags t \
             JOIN asset_tags atg ON atg.tag_id = t.id \
             WHERE atg.asset_id = $1 \
             ORDER BY t.name",
        )
        .bind(asset_id)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Tag names for many assets in one query, keyed by asset id.
    pub async fn names_for_assets(
        pool: &PgPool,
        asset_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<String>>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT atg.asset_id, t.name FROM tags t \
             JOIN asset_tags atg ON atg.tag_id = t.id \
             WHERE atg.asset_id = ANY($1) \
             ORDER BY atg.asset_id, t.name",
        )
        .bind(asset_ids)
        .fetch_all(pool)
        .await?;

        let mut by_asset: HashMap<DbId, Vec<String>> = HashMap::new();
        for (asset_id, name) in rows {
            by_asset.entry(asset_id).or_default().push(name);
        }
        Ok(by_asset)
    }

    /// Replace the tag set of an asset, creating missing tags.
    ///
    /// Names are trimmed; blanks are dropped.
    pub async fn set_for_asset(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        asset_id: DbId,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut names: Vec<String> = names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        names.dedup();

        sqlx::query("DELETE FROM asset_tags WHERE asset_id = $1")
            .bind(asset_id)
            .execute(&mut **tx)
            .await?;

        if names.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO tags (name) SELECT unnest($1::text[]) \
             ON CONFLICT ON CONSTRAINT uq_tags_name DO NOTHING",
        )
        .bind(&names)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO asset_tags (asset_id, tag_id) \
             SELECT $1, id FROM tags WHERE name = ANY($2)",
        )
        .bind(asset_id)
        .bind(&names)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
