use async_trait::async_trait;
use jiff::Timestamp;
use pinhole_core::repository::{ReadRepository, Repository, Result};
use pinhole_core::{
    LinkId, LinkPage, LinkQuery, NewShortLink, NormalizedUrl, ShortCode, ShortLink, StorageError,
};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::trace;
use uuid::Uuid;

/// Schema for the `short_links` table.
pub const SCHEMA: &str = include_str!("../ddl/mysql/short_links.sql");

/// MySQL implementation of the repository contract.
///
/// Code uniqueness is enforced by the `uk_short_links_code` index; an insert
/// that loses a race surfaces as a unique violation and is reported as
/// [`StorageError::Conflict`]. Click increments are a single
/// `UPDATE ... click_count + 1`, so the database serializes them.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `short_links` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

fn parse_id(raw: &str) -> Result<LinkId> {
    Uuid::parse_str(raw)
        .map(LinkId::from_uuid)
        .map_err(|e| StorageError::InvalidData(format!("invalid link id '{}': {e}", raw)))
}

fn row_to_link(row: &MySqlRow) -> Result<ShortLink> {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let code: String = row.try_get("code").map_err(map_sqlx_error)?;
    let target_url: String = row.try_get("target_url").map_err(map_sqlx_error)?;
    let owner_id: Option<String> = row.try_get("owner_id").map_err(map_sqlx_error)?;
    let click_count: u64 = row.try_get("click_count").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(ShortLink {
        id: parse_id(&id)?,
        code: ShortCode::new_unchecked(code),
        target_url: NormalizedUrl::new_unchecked(target_url),
        owner_id,
        click_count,
        created_at: parse_created_at(created_at)?,
    })
}

/// `LIKE` pattern matching `term` anywhere, with wildcards in `term` escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, target_url, owner_id, click_count, created_at
            FROM short_links
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_link).transpose()
    }

    async fn list(&self, query: &LinkQuery) -> Result<LinkPage> {
        let pattern = query.search_term().map(|term| contains_pattern(&term));
        let filter = if pattern.is_some() {
            "WHERE LOWER(target_url) LIKE ? OR LOWER(code) LIKE ?"
        } else {
            ""
        };

        let count_sql = format!("SELECT COUNT(*) FROM short_links {filter}");
        let mut count = sqlx::query_scalar::<sqlx::MySql, i64>(&count_sql);
        if let Some(pattern) = &pattern {
            count = count.bind(pattern.as_str()).bind(pattern.as_str());
        }
        let total = count.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;

        let page_sql = format!(
            r#"
            SELECT id, code, target_url, owner_id, click_count, created_at
            FROM short_links
            {filter}
            ORDER BY created_at DESC, code ASC
            LIMIT ? OFFSET ?
            "#
        );
        let mut page = sqlx::query::<sqlx::MySql>(&page_sql);
        if let Some(pattern) = &pattern {
            page = page.bind(pattern.as_str()).bind(pattern.as_str());
        }
        let rows = page
            .bind(query.effective_limit())
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let links = rows.iter().map(row_to_link).collect::<Result<Vec<_>>>()?;
        trace!(total, returned = links.len(), "listed short links");

        Ok(LinkPage {
            links,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert_if_absent(&self, link: NewShortLink) -> Result<ShortLink> {
        let stored = link.into_link(LinkId::new(), Timestamp::now());

        let result = sqlx::query(
            r#"
            INSERT INTO short_links (id, code, target_url, owner_id, click_count, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(stored.id.to_string())
        .bind(stored.code.as_str())
        .bind(stored.target_url.as_str())
        .bind(stored.owner_id.as_deref())
        .bind(stored.created_at.as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                trace!(code = %stored.code, "inserted short link");
                // Match the second precision of what a later read returns.
                let created_at = parse_created_at(stored.created_at.as_second())?;
                Ok(ShortLink {
                    created_at,
                    ..stored
                })
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(stored.code.into_inner()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_clicks(&self, code: &ShortCode) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE short_links
            SET click_count = click_count + 1
            WHERE code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_at_round_trips_seconds() {
        let ts = parse_created_at(1_700_000_000).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
    }

    #[test]
    fn invalid_id_is_reported_as_invalid_data() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[test]
    fn pool_timeout_maps_to_timeout() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StorageError::InvalidData(_)
        ));
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("docs"), "%docs%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn schema_declares_unique_code() {
        assert!(SCHEMA.contains("UNIQUE KEY uk_short_links_code (code)"));
    }
}
