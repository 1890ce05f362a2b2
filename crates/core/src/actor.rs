//! Actor identity boundary.
//!
//! Actors (users of the review workflow) are authenticated and stored by
//! an external collaborator; this core only consumes the parts it needs
//! for ownership and edit-permission checks.

use serde_json::json;
use uuid::Uuid;
use vrr_types::{NonEmptyText, Role};

/// An external actor: a funeral director, physician, registrar or other
/// participant in the review workflow.
///
/// Roles are ordered; the first role is the actor's primary role.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub name: NonEmptyText,
    pub roles: Vec<Role>,
}

impl Actor {
    /// The actor's primary role, when any role is assigned.
    pub fn primary_role(&self) -> Option<&Role> {
        self.roles.first()
    }

    /// Whether any of the actor's roles matches the given role name.
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Read-only JSON view used by record projections.
    pub fn as_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "name": self.name.as_str(),
            "roles": self.roles,
        })
    }
}
