//! Database operations for the `slides` table (homepage hero banner).

use aip_core::{Slide, SlideDraft, SlidePatch};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct SlideRow {
    id: i64,
    image: String,
    label: String,
}

impl From<SlideRow> for Slide {
    fn from(row: SlideRow) -> Self {
        Slide {
            id: row.id,
            image: row.image,
            label: row.label,
        }
    }
}

/// All slides in display order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_slides(pool: &PgPool) -> Result<Vec<Slide>, DbError> {
    let rows = sqlx::query_as::<_, SlideRow>("SELECT id, image, label FROM slides ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Slide::from).collect())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_slide(pool: &PgPool, draft: &SlideDraft) -> Result<Slide, DbError> {
    let row = sqlx::query_as::<_, SlideRow>(
        "INSERT INTO slides (image, label) VALUES ($1, $2) RETURNING id, image, label",
    )
    .bind(&draft.image)
    .bind(&draft.label)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no slide has `id`, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn update_slide(pool: &PgPool, id: i64, patch: &SlidePatch) -> Result<Slide, DbError> {
    let row = sqlx::query_as::<_, SlideRow>(
        "UPDATE slides \
         SET image = COALESCE($2, image), label = COALESCE($3, label) \
         WHERE id = $1 \
         RETURNING id, image, label",
    )
    .bind(id)
    .bind(patch.image.as_deref())
    .bind(patch.label.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;
    Ok(row.into())
}

/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_slide(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM slides WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
