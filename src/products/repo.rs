use anyhow::Context;
use sqlx::{PgConnection, PgExecutor};

use super::entity::Product;
use super::repo_types::ProductRow;

const COLUMNS: &str = "id, created_at, updated_at, name, description, price, size, \
                       composition, manufacturer, description_internal, category_id";

pub async fn list<'e>(db: impl PgExecutor<'e>, limit: i64, offset: i64) -> anyhow::Result<Vec<ProductRow>> {
    let sql = format!("SELECT {COLUMNS} FROM product ORDER BY id LIMIT $1 OFFSET $2");
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list products")?;
    Ok(rows)
}

pub async fn find<'e>(db: impl PgExecutor<'e>, id: i64) -> anyhow::Result<Option<ProductRow>> {
    let sql = format!("SELECT {COLUMNS} FROM product WHERE id = $1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find product")?;
    Ok(row)
}

pub async fn find_for_update(conn: &mut PgConnection, id: i64) -> anyhow::Result<Option<ProductRow>> {
    let sql = format!("SELECT {COLUMNS} FROM product WHERE id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .context("lock product")?;
    Ok(row)
}

pub async fn name_taken<'e>(
    db: impl PgExecutor<'e>,
    name: &str,
    except_id: Option<i64>,
) -> anyhow::Result<bool> {
    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM product
             WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(name)
    .bind(except_id)
    .fetch_one(db)
    .await
    .context("product name lookup")?;
    Ok(taken)
}

pub async fn insert(conn: &mut PgConnection, p: &Product) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO product (created_at, updated_at, name, description, price, size,
                             composition, manufacturer, description_internal, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(p.created_at)
    .bind(p.updated_at)
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.price.map(|price| price.amount()))
    .bind(&p.size)
    .bind(&p.composition)
    .bind(&p.manufacturer)
    .bind(&p.description_internal)
    .bind(p.category_id)
    .fetch_one(conn)
    .await
}

pub async fn update(conn: &mut PgConnection, id: i64, p: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE product
           SET updated_at = $2, name = $3, description = $4, price = $5, size = $6,
               composition = $7, manufacturer = $8, description_internal = $9,
               category_id = $10
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(p.updated_at)
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.price.map(|price| price.amount()))
    .bind(&p.size)
    .bind(&p.composition)
    .bind(&p.manufacturer)
    .bind(&p.description_internal)
    .bind(p.category_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM product WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .context("delete product")?;
    Ok(res.rows_affected())
}

/// Removes every product filed under `category_id`; returns how many went.
pub async fn delete_by_category(conn: &mut PgConnection, category_id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM product WHERE category_id = $1")
        .bind(category_id)
        .execute(conn)
        .await
        .context("delete products by category")?;
    Ok(res.rows_affected())
}
