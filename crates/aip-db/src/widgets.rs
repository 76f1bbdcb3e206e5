//! Database operations for `widgets` and the `products_widgets` join table.

use std::collections::HashMap;

use aip_core::{Product, Widget};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::products::{ProductRow, PRODUCT_COLUMNS};
use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WidgetRow {
    pub widget_id: i64,
    pub widget_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    widget_id: i64,
    #[sqlx(flatten)]
    product: ProductRow,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Every widget with its member products, oldest widget first. Members
/// appear in the order they were added.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails, or [`DbError::ColorDecode`]
/// if a member product carries malformed colors.
pub async fn list_widgets(pool: &PgPool) -> Result<Vec<Widget>, DbError> {
    let widgets = sqlx::query_as::<_, WidgetRow>(
        "SELECT widget_id, widget_name, created_at FROM widgets ORDER BY created_at, widget_id",
    )
    .fetch_all(pool)
    .await?;

    let member_columns = PRODUCT_COLUMNS
        .split(", ")
        .map(|col| format!("p.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT pw.widget_id, {member_columns} \
         FROM products_widgets pw \
         JOIN products p ON p.product_id = pw.product_id \
         ORDER BY pw.widget_id, pw.added_at, p.product_id"
    );
    let members = sqlx::query_as::<_, MemberRow>(&sql).fetch_all(pool).await?;

    let mut by_widget: HashMap<i64, Vec<Product>> = HashMap::new();
    for member in members {
        by_widget
            .entry(member.widget_id)
            .or_default()
            .push(member.product.into_product()?);
    }

    Ok(widgets
        .into_iter()
        .map(|row| Widget {
            products: by_widget.remove(&row.widget_id).unwrap_or_default(),
            widget_id: row.widget_id,
            widget_name: row.widget_name,
            created_at: row.created_at,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_widget(pool: &PgPool, widget_name: &str) -> Result<WidgetRow, DbError> {
    let row = sqlx::query_as::<_, WidgetRow>(
        "INSERT INTO widgets (widget_name) VALUES ($1) \
         RETURNING widget_id, widget_name, created_at",
    )
    .bind(widget_name)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no widget has `widget_id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn rename_widget(
    pool: &PgPool,
    widget_id: i64,
    widget_name: &str,
) -> Result<WidgetRow, DbError> {
    sqlx::query_as::<_, WidgetRow>(
        "UPDATE widgets SET widget_name = $2 WHERE widget_id = $1 \
         RETURNING widget_id, widget_name, created_at",
    )
    .bind(widget_id)
    .bind(widget_name)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Deletes a widget and its memberships. Member products are untouched.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_widget(pool: &PgPool, widget_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM widgets WHERE widget_id = $1")
        .bind(widget_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Adds a product to a widget. Adding an existing member is a no-op.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the widget or product does not exist, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn add_widget_product(
    pool: &PgPool,
    widget_id: i64,
    product_id: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "INSERT INTO products_widgets (widget_id, product_id) VALUES ($1, $2) \
         ON CONFLICT (widget_id, product_id) DO NOTHING",
    )
    .bind(widget_id)
    .bind(product_id)
    .execute(pool)
    .await;

    match result.map_err(DbError::from) {
        Ok(_) => Ok(()),
        Err(err) if err.is_foreign_key_violation() => Err(DbError::NotFound),
        Err(err) => Err(err),
    }
}

/// Returns `true` if the membership existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn remove_widget_product(
    pool: &PgPool,
    widget_id: i64,
    product_id: i64,
) -> Result<bool, DbError> {
    let result =
        sqlx::query("DELETE FROM products_widgets WHERE widget_id = $1 AND product_id = $2")
            .bind(widget_id)
            .bind(product_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
