use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{info, warn};

use super::dto::{CategoryInput, CategoryRead};
use super::entity::{Category, NAME_TAKEN};
use super::repo;
use crate::auth::policy::{authorize, Operation, Principal, Resource};
use crate::error::{AppError, Violation};
use crate::pagination::Pagination;
use crate::products;
use crate::validation::{ensure_valid, unique_or_internal};

fn check_access(principal: Option<&Principal>, op: Operation) -> Result<(), AppError> {
    authorize(principal, Resource::Category, op)
        .into_result(principal)
        .map_err(|e| {
            warn!(?op, error = %e, "category access denied");
            e
        })
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Category {id} not found"))
}

/// Entity rules plus name uniqueness, checked inside the write transaction.
async fn validate(conn: &mut sqlx::PgConnection, category: &Category) -> Result<(), AppError> {
    let mut violations = category.violations();
    if violations.iter().all(|v| v.property_path != "name")
        && repo::name_taken(&mut *conn, &category.name, category.id).await?
    {
        violations.push(Violation::new("name", NAME_TAKEN));
    }
    ensure_valid(violations)
}

pub async fn list(
    db: &PgPool,
    principal: Option<&Principal>,
    page: &Pagination,
) -> Result<Vec<CategoryRead>, AppError> {
    check_access(principal, Operation::List)?;

    let rows = repo::list(db, page.limit(), page.offset()?).await?;
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut products: HashMap<i64, Vec<i64>> = HashMap::new();
    for (category_id, product_id) in repo::product_ids(db, &ids).await? {
        products.entry(category_id).or_default().push(product_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let owned = products.remove(&row.id).unwrap_or_default();
            CategoryRead::view(&row.into_entity(owned))
        })
        .collect())
}

pub async fn get(
    db: &PgPool,
    principal: Option<&Principal>,
    id: i64,
) -> Result<CategoryRead, AppError> {
    check_access(principal, Operation::Read)?;

    let row = repo::find(db, id).await?.ok_or_else(|| not_found(id))?;
    let owned = product_ids_of(db, id).await?;
    Ok(CategoryRead::view(&row.into_entity(owned)))
}

async fn product_ids_of<'e>(db: impl sqlx::PgExecutor<'e>, id: i64) -> anyhow::Result<Vec<i64>> {
    Ok(repo::product_ids(db, &[id])
        .await?
        .into_iter()
        .map(|(_, product_id)| product_id)
        .collect())
}

pub async fn create(
    db: &PgPool,
    principal: &Principal,
    input: CategoryInput,
) -> Result<CategoryRead, AppError> {
    check_access(Some(principal), Operation::Create)?;

    let mut category = Category::new();
    input.replace(&mut category);

    let mut tx = db.begin().await?;
    validate(&mut tx, &category).await?;
    let id = repo::insert(&mut tx, &category)
        .await
        .map_err(|e| unique_or_internal(e, "name", NAME_TAKEN))?;
    tx.commit().await?;

    category.id = Some(id);
    info!(category_id = id, name = %category.name, user_id = %principal.user_id, "category created");
    Ok(CategoryRead::view(&category))
}

/// PUT and PATCH share this path; `replace` selects the input semantics.
pub async fn update(
    db: &PgPool,
    principal: &Principal,
    id: i64,
    input: CategoryInput,
    replace: bool,
) -> Result<CategoryRead, AppError> {
    let op = if replace { Operation::Replace } else { Operation::Patch };
    check_access(Some(principal), op)?;

    let mut tx = db.begin().await?;
    let row = repo::find_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let owned = product_ids_of(&mut *tx, id).await?;
    let mut category = row.into_entity(owned);

    if replace {
        input.replace(&mut category);
    } else {
        input.merge(&mut category);
    }
    validate(&mut tx, &category).await?;

    category.touch();
    repo::update(&mut tx, id, &category)
        .await
        .map_err(|e| unique_or_internal(e, "name", NAME_TAKEN))?;
    tx.commit().await?;

    info!(category_id = id, name = %category.name, user_id = %principal.user_id, "category updated");
    Ok(CategoryRead::view(&category))
}

/// Deletes the category and every product filed under it, atomically.
pub async fn delete(db: &PgPool, principal: &Principal, id: i64) -> Result<(), AppError> {
    check_access(Some(principal), Operation::Delete)?;

    let mut tx = db.begin().await?;
    repo::find_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let removed = products::repo::delete_by_category(&mut tx, id).await?;
    repo::delete(&mut tx, id).await?;
    tx.commit().await?;

    info!(category_id = id, products_removed = removed, user_id = %principal.user_id, "category deleted");
    Ok(())
}
