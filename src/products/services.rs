use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use super::dto::{ProductInput, ProductRead};
use super::entity::{Product, NAME_TAKEN};
use super::repo;
use crate::auth::policy::{
    authorize, authorize_object_update, can_view_internal, Decision, Operation, Principal,
    Resource,
};
use crate::categories;
use crate::error::{AppError, Violation};
use crate::pagination::Pagination;
use crate::validation::{ensure_valid, is_foreign_key_violation, unique_or_internal};

fn check_access(principal: Option<&Principal>, op: Operation) -> Result<(), AppError> {
    authorize(principal, Resource::Product, op)
        .into_result(principal)
        .map_err(|e| {
            warn!(?op, error = %e, "product access denied");
            e
        })
}

const CATEGORY_GONE: &str = "This Category does not exist.";

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Product {id} not found"))
}

/// Resolves the submitted category reference. `Ok(None)` means no reference
/// was submitted; a malformed or dangling one is a violation on `category`.
async fn resolve_category(
    conn: &mut PgConnection,
    input: &ProductInput,
    violations: &mut Vec<Violation>,
) -> Result<Option<i64>, AppError> {
    let Some(reference) = input.category_ref() else {
        return Ok(None);
    };
    let Some(id) = reference.id_in("categories") else {
        violations.push(Violation::new("category", "Invalid IRI for a category."));
        return Ok(None);
    };
    if !categories::repo::exists_locked(&mut *conn, id).await? {
        violations.push(Violation::new("category", CATEGORY_GONE));
        return Ok(None);
    }
    Ok(Some(id))
}

/// Maps constraint failures raised on write onto field violations.
fn persist_error(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        return AppError::invalid("category", CATEGORY_GONE);
    }
    unique_or_internal(err, "name", NAME_TAKEN)
}

/// Entity rules plus name uniqueness; `pending` carries violations found
/// while applying the input.
async fn validate(
    conn: &mut PgConnection,
    product: &Product,
    mut pending: Vec<Violation>,
) -> Result<(), AppError> {
    // A broken reference already explains the missing category.
    let reference_broken = pending.iter().any(|v| v.property_path == "category");
    pending.extend(
        product
            .violations()
            .into_iter()
            .filter(|v| !(reference_broken && v.property_path == "category")),
    );
    if pending.iter().all(|v| v.property_path != "name")
        && repo::name_taken(&mut *conn, &product.name, product.id).await?
    {
        pending.push(Violation::new("name", NAME_TAKEN));
    }
    ensure_valid(pending)
}

/// Runs the object-level policy once input has been merged, so the decision
/// can look at the updated product rather than the request.
fn post_merge_check(principal: &Principal, product: &mut Product, previous: Option<String>) {
    let decision = authorize_object_update(principal, product);
    revert_internal_on_deny(decision, product, previous);
}

/// A denied caller keeps the previously stored internal description.
fn revert_internal_on_deny(decision: Decision, product: &mut Product, previous: Option<String>) {
    if let Decision::Deny(reason) = decision {
        warn!(%reason, "descriptionInternal change reverted");
        product.set_description_internal(previous);
    }
}

pub async fn list(
    db: &PgPool,
    principal: Option<&Principal>,
    page: &Pagination,
) -> Result<Vec<ProductRead>, AppError> {
    check_access(principal, Operation::List)?;
    let show_internal = can_view_internal(principal);

    let rows = repo::list(db, page.limit(), page.offset()?).await?;
    Ok(rows
        .into_iter()
        .map(|row| ProductRead::view(&Product::from(row), show_internal))
        .collect())
}

pub async fn get(
    db: &PgPool,
    principal: Option<&Principal>,
    id: i64,
) -> Result<ProductRead, AppError> {
    check_access(principal, Operation::Read)?;

    let row = repo::find(db, id).await?.ok_or_else(|| not_found(id))?;
    Ok(ProductRead::view(&Product::from(row), can_view_internal(principal)))
}

pub async fn create(
    db: &PgPool,
    principal: &Principal,
    input: ProductInput,
) -> Result<ProductRead, AppError> {
    check_access(Some(principal), Operation::Create)?;
    let input = input.restrict(can_view_internal(Some(principal)));
    let touches_internal = input.touches_internal();

    let mut tx = db.begin().await?;
    let mut pending = Vec::new();
    let category_id = resolve_category(&mut tx, &input, &mut pending).await?;

    let mut product = Product::new();
    input.replace(&mut product, category_id);
    if touches_internal {
        post_merge_check(principal, &mut product, None);
    }
    validate(&mut tx, &product, pending).await?;

    let id = repo::insert(&mut tx, &product)
        .await
        .map_err(persist_error)?;
    tx.commit().await?;

    product.id = Some(id);
    info!(product_id = id, name = %product.name, user_id = %principal.user_id, "product created");
    Ok(ProductRead::view(&product, can_view_internal(Some(principal))))
}

/// PUT and PATCH share this path; `replace` selects the input semantics.
pub async fn update(
    db: &PgPool,
    principal: &Principal,
    id: i64,
    input: ProductInput,
    replace: bool,
) -> Result<ProductRead, AppError> {
    let op = if replace { Operation::Replace } else { Operation::Patch };
    check_access(Some(principal), op)?;
    let input = input.restrict(can_view_internal(Some(principal)));
    let touches_internal = input.touches_internal();

    let mut tx = db.begin().await?;
    let mut product = Product::from(
        repo::find_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(id))?,
    );
    let previous_internal = product.description_internal.clone();

    let mut pending = Vec::new();
    let category_id = resolve_category(&mut tx, &input, &mut pending).await?;
    if replace {
        input.replace(&mut product, category_id);
    } else {
        input.merge(&mut product, category_id);
    }
    if touches_internal {
        post_merge_check(principal, &mut product, previous_internal);
    }
    validate(&mut tx, &product, pending).await?;

    product.touch();
    repo::update(&mut tx, id, &product)
        .await
        .map_err(persist_error)?;
    tx.commit().await?;

    info!(product_id = id, name = %product.name, user_id = %principal.user_id, "product updated");
    Ok(ProductRead::view(&product, can_view_internal(Some(principal))))
}

pub async fn delete(db: &PgPool, principal: &Principal, id: i64) -> Result<(), AppError> {
    check_access(Some(principal), Operation::Delete)?;

    let mut tx = db.begin().await?;
    if repo::delete(&mut tx, id).await? == 0 {
        return Err(not_found(id));
    }
    tx.commit().await?;

    info!(product_id = id, user_id = %principal.user_id, "product deleted");
    Ok(())
}
