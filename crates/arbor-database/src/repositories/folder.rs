//! Folder repository implementation.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use arbor_core::error::{AppError, ErrorKind};
use arbor_core::result::AppResult;
use arbor_core::types::{FolderId, UserId};
use arbor_entity::folder::{FolderFilter, ParentList, ParentRef};
use arbor_entity::Folder;

/// Repository for folder records and subtree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a folder by ID.
    pub async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    /// List direct children of a folder, oldest first.
    pub async fn find_children(&self, parent: FolderId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(ParentRef::Folder(parent))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    /// List an owner's folders matching a filter.
    pub async fn find_filtered(&self, filter: &FolderFilter) -> AppResult<Vec<Folder>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM folders WHERE owner_id = ");
        query.push_bind(filter.owner_id);

        if let Some(parent) = filter.parent {
            query.push(" AND parent = ").push_bind(parent);
        }
        if let Some(needle) = &filter.name_contains {
            query
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)));
        }

        let direction = filter.sort.direction().as_sql();
        query.push(format!(
            " ORDER BY {} {direction}, id {direction}",
            filter.sort.column()
        ));
        if let Some(limit) = filter.pagination.sql_limit() {
            query.push(" LIMIT ").push_bind(limit);
        }
        query.push(" OFFSET ").push_bind(filter.pagination.offset());

        query
            .build_query_as::<Folder>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    /// Every folder of `owner_id` below `ancestor`, shallowest first.
    pub async fn find_within(&self, owner_id: UserId, ancestor: FolderId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND $2 = ANY(parent_list) \
             ORDER BY cardinality(parent_list) ASC, created_at ASC, id ASC",
        )
        .bind(owner_id)
        .bind(ancestor.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list descendants", e))
    }

    /// Insert a new folder.
    pub async fn create(&self, folder: &Folder) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO folders (id, name, owner_id, parent, parent_list, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.owner_id)
        .bind(folder.parent())
        .bind(folder.parent_list())
        .bind(folder.created_at)
        .bind(folder.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create folder", e))?;
        Ok(())
    }

    /// Rename a folder. Only `name` and `updated_at` are written.
    pub async fn rename(&self, folder: &Folder) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE folders SET name = $2, updated_at = $3 WHERE id = $1 AND owner_id = $4",
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.updated_at)
        .bind(folder.owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename folder", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Folder {} not found", folder.id)));
        }
        Ok(())
    }

    /// Persist a folder's placement.
    pub async fn place(&self, folder: &Folder) -> AppResult<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::place_on(&mut conn, folder).await
    }

    /// Persist a folder's placement on an existing connection or transaction.
    /// The name column is not written.
    pub async fn place_on(conn: &mut PgConnection, folder: &Folder) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE folders SET parent = $2, parent_list = $3, updated_at = $4 \
             WHERE id = $1 AND owner_id = $5",
        )
        .bind(folder.id)
        .bind(folder.parent())
        .bind(folder.parent_list())
        .bind(folder.updated_at)
        .bind(folder.owner_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update folder placement", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Folder {} not found", folder.id)));
        }
        Ok(())
    }

    /// Rewrite the ancestor list of every folder below `anchor`: the segment
    /// in front of `anchor` becomes `base`. Lists already starting with
    /// `base` are left alone. Returns the number of rows changed.
    pub async fn rebase_within(
        conn: &mut PgConnection,
        owner_id: UserId,
        anchor: FolderId,
        base: &ParentList,
    ) -> AppResult<u64> {
        sqlx::query(
            "UPDATE folders \
             SET parent_list = $3::text[] || parent_list[array_position(parent_list, $2):], \
                 updated_at = NOW() \
             WHERE owner_id = $1 AND $2 = ANY(parent_list) \
               AND parent_list[1:array_position(parent_list, $2) - 1] IS DISTINCT FROM $3::text[]",
        )
        .bind(owner_id)
        .bind(anchor.to_string())
        .bind(base)
        .execute(&mut *conn)
        .await
        .map(|r| r.rows_affected())
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rewrite folder paths", e)
        })
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
