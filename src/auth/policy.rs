//! Authorization rules for the catalog resources.
//!
//! Every handler asks these functions before touching storage; none of them
//! perform I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AppError;
use crate::products::entity::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    /// Unknown role names stored in the database are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ROLE_USER" => Some(Role::User),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(user_id: Uuid, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Product,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Category => f.write_str("category"),
            Resource::Product => f.write_str("product"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Create,
    Replace,
    Patch,
    Delete,
}

impl Operation {
    pub fn is_write(&self) -> bool {
        !matches!(self, Operation::List | Operation::Read)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Anonymous callers get 401, authenticated ones 403.
    pub fn into_result(self, principal: Option<&Principal>) -> Result<(), AppError> {
        match (self, principal) {
            (Decision::Allow, _) => Ok(()),
            (Decision::Deny(reason), None) => Err(AppError::Unauthorized(reason)),
            (Decision::Deny(reason), Some(_)) => Err(AppError::Forbidden(reason)),
        }
    }
}

/// Operation-level check: reads are public, writes need `ROLE_ADMIN`.
pub fn authorize(principal: Option<&Principal>, resource: Resource, op: Operation) -> Decision {
    if !op.is_write() {
        return Decision::Allow;
    }
    match principal {
        Some(p) if p.is_admin() => Decision::Allow,
        Some(_) => Decision::Deny(format!("{op:?} on {resource} requires ROLE_ADMIN")),
        None => Decision::Deny(format!("{op:?} on {resource} requires authentication")),
    }
}

/// Whether `descriptionInternal` may be read or submitted by this caller.
pub fn can_view_internal(principal: Option<&Principal>) -> bool {
    principal.is_some_and(Principal::is_admin)
}

/// Object-level check run after input has been merged into `product`.
pub fn authorize_object_update(principal: &Principal, product: &Product) -> Decision {
    if principal.is_admin() {
        Decision::Allow
    } else {
        Decision::Deny(format!(
            "user {} may not update product {}",
            principal.user_id,
            product.id.map(|id| id.to_string()).unwrap_or_else(|| "(new)".into())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Principal {
        Principal::new(Uuid::new_v4(), vec![Role::User])
    }

    fn admin() -> Principal {
        Principal::new(Uuid::new_v4(), vec![Role::User, Role::Admin])
    }

    #[test]
    fn reads_are_public() {
        for op in [Operation::List, Operation::Read] {
            assert!(authorize(None, Resource::Category, op).is_allowed());
            assert!(authorize(Some(&user()), Resource::Product, op).is_allowed());
        }
    }

    #[test]
    fn writes_require_admin() {
        let ops = [
            Operation::Create,
            Operation::Replace,
            Operation::Patch,
            Operation::Delete,
        ];
        for op in ops {
            assert!(!authorize(None, Resource::Category, op).is_allowed());
            assert!(!authorize(Some(&user()), Resource::Product, op).is_allowed());
            assert!(authorize(Some(&admin()), Resource::Product, op).is_allowed());
        }
    }

    #[test]
    fn denial_maps_to_401_or_403() {
        let deny = authorize(None, Resource::Category, Operation::Delete);
        assert!(matches!(deny.into_result(None), Err(AppError::Unauthorized(_))));

        let u = user();
        let deny = authorize(Some(&u), Resource::Category, Operation::Delete);
        assert!(matches!(
            deny.into_result(Some(&u)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn internal_description_is_admin_only() {
        assert!(!can_view_internal(None));
        assert!(!can_view_internal(Some(&user())));
        assert!(can_view_internal(Some(&admin())));
    }

    #[test]
    fn role_names_round_trip() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("ROLE_SUPERHERO"), None);
    }
}
