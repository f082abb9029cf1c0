//! File placement repository implementation.
//!
//! Only placement columns are written here; `content` is inserted once and
//! never updated by this crate.

use sqlx::{PgConnection, PgPool};

use arbor_core::error::{AppError, ErrorKind};
use arbor_core::result::AppResult;
use arbor_core::types::{FileId, FolderId, UserId};
use arbor_entity::folder::ParentList;
use arbor_entity::FileNode;

/// Repository for file placement records.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileNode>> {
        sqlx::query_as::<_, FileNode>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    /// Every file of `owner_id` below `ancestor`.
    pub async fn find_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<FileNode>> {
        sqlx::query_as::<_, FileNode>(
            "SELECT * FROM files WHERE owner_id = $1 AND $2 = ANY(parent_list) \
             ORDER BY cardinality(parent_list) ASC, created_at ASC, id ASC",
        )
        .bind(owner_id)
        .bind(ancestor.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    /// Insert a new file placement record.
    pub async fn create(&self, file: &FileNode) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO files \
             (id, filename, owner_id, parent, parent_list, length, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(file.id)
        .bind(&file.filename)
        .bind(file.owner_id)
        .bind(file.parent())
        .bind(file.parent_list())
        .bind(file.length)
        .bind(&file.content)
        .bind(file.created_at)
        .bind(file.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))?;
        Ok(())
    }

    /// Persist a file's placement.
    pub async fn update_placement(&self, file: &FileNode) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE files SET parent = $2, parent_list = $3, updated_at = $4 \
             WHERE id = $1 AND owner_id = $5",
        )
        .bind(file.id)
        .bind(file.parent())
        .bind(file.parent_list())
        .bind(file.updated_at)
        .bind(file.owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update file placement", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("File {} not found", file.id)));
        }
        Ok(())
    }

    /// Rewrite the ancestor list of every file below `anchor`; see
    /// `FolderRepository::rebase_within`.
    pub async fn rebase_within(
        conn: &mut PgConnection,
        owner_id: UserId,
        anchor: FolderId,
        base: &ParentList,
    ) -> AppResult<u64> {
        sqlx::query(
            "UPDATE files \
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
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rewrite file paths", e))
    }
}
