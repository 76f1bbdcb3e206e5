//! Database operations for the `products` table, including the filtered,
//! paginated catalog listing.

use aip_core::{
    decode_colors, encode_colors, page_offset, CatalogQuery, Product, ProductDraft, ProductPatch,
    PAGE_SIZE,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

pub(crate) const PRODUCT_COLUMNS: &str = "product_id, product_name, description, \
     short_description, price, is_sale, sales_price, stock_quantity, is_in_stock, \
     low_stock_threshold, size, images, colors, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `products` table. `colors` is still in its stored,
/// delimited form.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: i64,
    pub product_name: String,
    pub description: String,
    pub short_description: String,
    pub price: Decimal,
    pub is_sale: bool,
    pub sales_price: Decimal,
    pub stock_quantity: i32,
    pub is_in_stock: bool,
    pub low_stock_threshold: i32,
    pub size: String,
    pub images: Vec<String>,
    pub colors: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Decodes the stored color string into structured entries.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ColorDecode`] when `colors` is malformed.
    pub fn into_product(self) -> Result<Product, DbError> {
        let colors = decode_colors(&self.colors).map_err(|source| DbError::ColorDecode {
            product_id: self.product_id,
            source,
        })?;
        Ok(Product {
            product_id: self.product_id,
            product_name: self.product_name,
            description: self.description,
            short_description: self.short_description,
            price: self.price,
            is_sale: self.is_sale,
            sales_price: self.sales_price,
            stock_quantity: self.stock_quantity,
            is_in_stock: self.is_in_stock,
            low_stock_threshold: self.low_stock_threshold,
            size: self.size,
            images: self.images,
            colors,
            created_at: self.created_at,
        })
    }
}

pub(crate) fn rows_into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, DbError> {
    rows.into_iter().map(ProductRow::into_product).collect()
}

// ---------------------------------------------------------------------------
// Catalog listing
// ---------------------------------------------------------------------------

/// Returns one page of products matching `query`, newest first.
///
/// Predicates are ANDed. `search` matches name or description, `size` is an
/// exact match and `color` is a substring of the stored color string.
/// Ties on `created_at` are broken by `product_id` so pages never overlap.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::ColorDecode`]
/// if a returned row carries malformed colors.
pub async fn list_catalog_page(
    pool: &PgPool,
    query: &CatalogQuery,
    page: u32,
) -> Result<Vec<Product>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} \
         FROM products \
         WHERE ($1::TEXT IS NULL OR product_name ILIKE $1 OR description ILIKE $1) \
           AND ($2::NUMERIC IS NULL OR price >= $2) \
           AND ($3::NUMERIC IS NULL OR price <= $3) \
           AND ($4::TEXT IS NULL OR size = $4) \
           AND ($5::TEXT IS NULL OR colors ILIKE $5) \
         ORDER BY created_at DESC, product_id DESC \
         LIMIT $6 OFFSET $7"
    );

    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(query.search_pattern())
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(query.size.as_deref())
        .bind(query.color_pattern())
        .bind(i64::from(PAGE_SIZE))
        .bind(page_offset(page))
        .fetch_all(pool)
        .await?;

    rows_into_products(rows)
}

// ---------------------------------------------------------------------------
// Single-product reads
// ---------------------------------------------------------------------------

/// Looks a product up by its exact name, as used by the detail route.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::ColorDecode`]
/// if the row carries malformed colors.
pub async fn get_product_by_name(pool: &PgPool, name: &str) -> Result<Option<Product>, DbError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_name = $1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    row.map(ProductRow::into_product).transpose()
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::ColorDecode`]
/// if the row carries malformed colors.
pub async fn get_product(pool: &PgPool, product_id: i64) -> Result<Option<Product>, DbError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    row.map(ProductRow::into_product).transpose()
}

// ---------------------------------------------------------------------------
// Admin writes
// ---------------------------------------------------------------------------

/// Inserts a validated draft and returns the stored product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a duplicate
/// `product_name`).
pub async fn create_product(pool: &PgPool, draft: &ProductDraft) -> Result<Product, DbError> {
    let sql = format!(
        "INSERT INTO products \
           (product_name, description, short_description, price, is_sale, sales_price, \
            stock_quantity, is_in_stock, low_stock_threshold, size, images, colors) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING {PRODUCT_COLUMNS}"
    );

    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(&draft.product_name)
        .bind(&draft.description)
        .bind(&draft.short_description)
        .bind(draft.price)
        .bind(draft.is_sale)
        .bind(draft.sales_price)
        .bind(draft.stock_quantity)
        .bind(draft.is_in_stock)
        .bind(draft.low_stock_threshold)
        .bind(&draft.size)
        .bind(&draft.images)
        .bind(encode_colors(&draft.colors))
        .fetch_one(pool)
        .await?;

    row.into_product()
}

/// Overlays the supplied fields of `patch` onto an existing product.
///
/// Every `None` keeps the stored value via `COALESCE`, in a single
/// `UPDATE … RETURNING` statement.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `product_id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_product(
    pool: &PgPool,
    product_id: i64,
    patch: &ProductPatch,
) -> Result<Product, DbError> {
    let sql = format!(
        "UPDATE products SET \
           product_name        = COALESCE($2, product_name), \
           description         = COALESCE($3, description), \
           short_description   = COALESCE($4, short_description), \
           price               = COALESCE($5, price), \
           is_sale             = COALESCE($6, is_sale), \
           sales_price         = COALESCE($7, sales_price), \
           stock_quantity      = COALESCE($8, stock_quantity), \
           is_in_stock         = COALESCE($9, is_in_stock), \
           low_stock_threshold = COALESCE($10, low_stock_threshold), \
           size                = COALESCE($11, size), \
           images              = COALESCE($12::TEXT[], images), \
           colors              = COALESCE($13, colors), \
           updated_at          = NOW() \
         WHERE product_id = $1 \
         RETURNING {PRODUCT_COLUMNS}"
    );

    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(product_id)
        .bind(patch.product_name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.short_description.as_deref())
        .bind(patch.price)
        .bind(patch.is_sale)
        .bind(patch.sales_price)
        .bind(patch.stock_quantity)
        .bind(patch.is_in_stock)
        .bind(patch.low_stock_threshold)
        .bind(patch.size.as_deref())
        .bind(patch.images.as_deref())
        .bind(patch.colors.as_deref().map(encode_colors))
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    row.into_product()
}

/// Deletes a product. Widget memberships go with it via `ON DELETE CASCADE`.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_product(pool: &PgPool, product_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
