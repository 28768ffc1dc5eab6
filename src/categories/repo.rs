use anyhow::Context;
use sqlx::{PgConnection, PgExecutor};

use super::entity::Category;
use super::repo_types::CategoryRow;

pub async fn list<'e>(db: impl PgExecutor<'e>, limit: i64, offset: i64) -> anyhow::Result<Vec<CategoryRow>> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, created_at, updated_at, name
          FROM category
         ORDER BY id
         LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list categories")?;
    Ok(rows)
}

pub async fn find<'e>(db: impl PgExecutor<'e>, id: i64) -> anyhow::Result<Option<CategoryRow>> {
    let row = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, created_at, updated_at, name
          FROM category
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find category")?;
    Ok(row)
}

/// Loads and row-locks a category for the rest of the transaction.
pub async fn find_for_update(conn: &mut PgConnection, id: i64) -> anyhow::Result<Option<CategoryRow>> {
    let row = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, created_at, updated_at, name
          FROM category
         WHERE id = $1
           FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .context("lock category")?;
    Ok(row)
}

/// Whether the category exists, holding a key-share lock on it until the
/// transaction ends. Waits out a concurrent delete and then sees it gone.
pub async fn exists_locked(conn: &mut PgConnection, id: i64) -> anyhow::Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM category WHERE id = $1 FOR KEY SHARE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context("lock category reference")?;
    Ok(found.is_some())
}

/// Whether another category already uses `name` (exact, case-sensitive).
pub async fn name_taken<'e>(
    db: impl PgExecutor<'e>,
    name: &str,
    except_id: Option<i64>,
) -> anyhow::Result<bool> {
    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM category
             WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(name)
    .bind(except_id)
    .fetch_one(db)
    .await
    .context("category name lookup")?;
    Ok(taken)
}

/// Product ids grouped by category, for every category in `ids`.
pub async fn product_ids<'e>(
    db: impl PgExecutor<'e>,
    ids: &[i64],
) -> anyhow::Result<Vec<(i64, i64)>> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT category_id, id
          FROM product
         WHERE category_id = ANY($1)
         ORDER BY id
        "#,
    )
    .bind(ids)
    .fetch_all(db)
    .await
    .context("list product ids by category")?;
    Ok(rows)
}

pub async fn insert(conn: &mut PgConnection, category: &Category) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO category (created_at, updated_at, name)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(category.created_at)
    .bind(category.updated_at)
    .bind(&category.name)
    .fetch_one(conn)
    .await
}

pub async fn update(conn: &mut PgConnection, id: i64, category: &Category) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE category
           SET updated_at = $2, name = $3
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(category.updated_at)
    .bind(&category.name)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM category WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .context("delete category")?;
    Ok(res.rows_affected())
}
