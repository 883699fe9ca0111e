//! Repository for the `formats` and `resources` tables.

use std::collections::HashMap;
use std::future::Future;
use std::ops::DerefMut;
use std::pin::Pin;

use gallery_core::formats::FormatEntry;
use gallery_core::types::DbId;
use sqlx::{Acquire, PgConnection, PgPool, Postgres};

use crate::models::format::{CreateFormat, Format, Resource};

/// Type-erased connection held by `list_for_assets`.
type BoxedConn<'c> = Box<dyn DerefMut<Target = PgConnection> + Send + 'c>;

/// Column list for `formats` queries.
const FORMAT_COLUMNS: &str = "\
    id, asset_id, format_type, role, archive_url, triangle_count, lod_hint, \
    created_at, updated_at";

/// Column list for `resources` queries.
const RESOURCE_COLUMNS: &str = "\
    id, format_id, is_root, file_path, external_url, content_type, created_at, updated_at";

/// Provides format attachment and loading.
pub struct FormatRepo;

impl FormatRepo {
    /// Attach a format and its resources to an asset in one transaction.
    pub async fn create(
        pool: &PgPool,
        asset_id: DbId,
        input: &CreateFormat,
    ) -> Result<FormatEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_format = format!(
            "INSERT INTO formats (asset_id, format_type, role, archive_url, triangle_count, lod_hint) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {FORMAT_COLUMNS}"
        );
        let format = sqlx::query_as::<_, Format>(&insert_format)
            .bind(asset_id)
            .bind(&input.format_type)
            .bind(input.role)
            .bind(input.archive_url.as_deref())
            .bind(input.triangle_count)
            .bind(input.lod_hint)
            .fetch_one(&mut *tx)
            .await?;

        let insert_resource = format!(
            "INSERT INTO resources (format_id, is_root, file_path, external_url, content_type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {RESOURCE_COLUMNS}"
        );
        let mut resources = Vec::with_capacity(input.resources.len());
        for resource in &input.resources {
            let row = sqlx::query_as::<_, Resource>(&insert_resource)
                .bind(format.id)
                .bind(resource.is_root)
                .bind(resource.file_path.as_deref())
                .bind(resource.external_url.as_deref())
                .bind(resource.content_type.as_deref())
                .fetch_one(&mut *tx)
                .await?;
            resources.push(row);
        }

        tx.commit().await?;
        Ok(format.into_entry(resources))
    }

    /// All formats of one asset with their resources, in insertion order.
    pub async fn list_for_asset<'c, A>(
        conn: A,
        asset_id: DbId,
    ) -> Result<Vec<FormatEntry>, sqlx::Error>
    where
        A: Acquire<'c, Database = Postgres> + 'c,
    {
        let mut by_asset = Self::list_for_assets(conn, &[asset_id]).await?;
        Ok(by_asset.remove(&asset_id).unwrap_or_default())
    }

    /// Formats for many assets with two queries, keyed by asset id.
    ///
    /// Accepts a pool or an open transaction.
    pub async fn list_for_assets<'c, A>(
        conn: A,
        asset_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<FormatEntry>>, sqlx::Error>
    where
        A: Acquire<'c, Database = Postgres> + 'c,
    {
        if asset_ids.is_empty() {
            return Ok(HashMap::new());
        }
        // Held behind a `dyn ... + Send` box: keeping the `A::Connection`
        // projection across awaits makes callers' futures fail their `Send`
        // check (rust-lang/rust#100013).
        let acquiring = conn.acquire();
        let acquire: Pin<Box<dyn Future<Output = Result<BoxedConn<'c>, sqlx::Error>> + Send + 'c>> =
            Box::pin(async move { Ok(Box::new(acquiring.await?) as BoxedConn<'c>) });
        let mut conn = acquire.await?;

        let format_query = format!(
            "SELECT {FORMAT_COLUMNS} FROM formats WHERE asset_id = ANY($1) ORDER BY asset_id, id"
        );
        let formats = sqlx::query_as::<_, Format>(&format_query)
            .bind(asset_ids)
            .fetch_all(&mut **conn)
            .await?;

        let format_ids: Vec<DbId> = formats.iter().map(|f| f.id).collect();
        let resource_query = format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE format_id = ANY($1) ORDER BY format_id, id"
        );
        let resources = sqlx::query_as::<_, Resource>(&resource_query)
            .bind(&format_ids)
            .fetch_all(&mut **conn)
            .await?;

        let mut resources_by_format: HashMap<DbId, Vec<Resource>> = HashMap::new();
        for resource in resources {
            resources_by_format
                .entry(resource.format_id)
                .or_default()
                .push(resource);
        }

        let mut by_asset: HashMap<DbId, Vec<FormatEntry>> = HashMap::new();
        for format in formats {
            let resources = resources_by_format.remove(&format.id).unwrap_or_default();
            by_asset
                .entry(format.asset_id)
                .or_default()
                .push(format.into_entry(resources));
        }
        Ok(by_asset)
    }
}
