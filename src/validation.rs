use validator::Validate;

use crate::error::{violations_from, AppError, Violation};

pub const NOT_BLANK: &str = "This value should not be blank.";
pub const NOT_NULL: &str = "This value should not be null.";

/// Runs the derived length rules of `entity`.
pub fn derived(entity: &impl Validate) -> Vec<Violation> {
    match entity.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => violations_from(errors),
    }
}

/// Empty only; whitespace counts as content.
pub fn not_blank(field: &str, value: &str, out: &mut Vec<Violation>) {
    if value.is_empty() {
        out.push(Violation::new(field, NOT_BLANK));
    }
}

/// Fails with a validation error when any violation was collected.
pub fn ensure_valid(mut violations: Vec<Violation>) -> Result<(), AppError> {
    if violations.is_empty() {
        return Ok(());
    }
    violations.sort_by(|a, b| a.property_path.cmp(&b.property_path));
    Err(AppError::Validation(violations))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

/// Maps a unique-constraint failure raised by PostgreSQL (a concurrent writer
/// won the race) onto the same violation the pre-check would have reported.
pub fn unique_or_internal(err: sqlx::Error, field: &str, message: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::invalid(field, message)
    } else {
        AppError::from(err)
    }
}

/// Same race as [`unique_or_internal`], reported as a 409.
pub fn conflict_or_internal(err: sqlx::Error, message: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(message.to_string())
    } else {
        AppError::from(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_valid_sorts_by_field() {
        let err = ensure_valid(vec![
            Violation::new("price", "a"),
            Violation::new("name", "b"),
        ])
        .unwrap_err();
        match err {
            AppError::Validation(v) => {
                assert_eq!(v[0].property_path, "name");
                assert_eq!(v[1].property_path, "price");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(ensure_valid(Vec::new()).is_ok());
    }

    #[test]
    fn non_database_errors_stay_internal() {
        let err = unique_or_internal(sqlx::Error::RowNotFound, "name", "taken");
        assert!(matches!(err, AppError::Internal(_)));
        let err = conflict_or_internal(sqlx::Error::RowNotFound, "taken");
        assert!(matches!(err, AppError::Internal(_)));
        assert!(!is_foreign_key_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn whitespace_is_not_blank() {
        let mut out = Vec::new();
        not_blank("name", "   ", &mut out);
        assert!(out.is_empty());
        not_blank("name", "", &mut out);
        assert_eq!(out, vec![Violation::new("name", NOT_BLANK)]);
    }
}
