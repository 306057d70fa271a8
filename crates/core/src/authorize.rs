//! Capability checks for operations on saves.
//!
//! Authorization is a single pure function over the acting user, the
//! requested action, the save's owner, and the share grants recorded for
//! the save. There is no policy-object dispatch: handlers call
//! [`can_perform`] (or [`require`]) directly, and tests exercise the rules
//! without any HTTP or database machinery.

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, ROLE_USER};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Share permission levels
// ---------------------------------------------------------------------------

/// Grantee may view the save.
pub const PERMISSION_READ: i32 = 1;
/// Grantee may view and edit the save (lock-gated like any edit).
pub const PERMISSION_EDIT: i32 = 2;

/// Returns `true` if the integer-coded permission level carries edit rights.
pub fn permission_includes_edit(permission: i32) -> bool {
    permission >= PERMISSION_EDIT
}

// ---------------------------------------------------------------------------
// Actors and actions
// ---------------------------------------------------------------------------

/// The acting user as seen by the capability check.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: DbId,
    /// Role name, e.g. `"admin"` or `"user"`.
    pub role: String,
}

impl Actor {
    pub fn new(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }
}

/// Operations a user can attempt on a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    /// List every save on the platform.
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    Share,
}

impl SaveAction {
    fn as_str(self) -> &'static str {
        match self {
            SaveAction::ViewAny => "view all saves",
            SaveAction::View => "view this save",
            SaveAction::Create => "create saves",
            SaveAction::Update => "update this save",
            SaveAction::Delete => "delete this save",
            SaveAction::Share => "share this save",
        }
    }
}

/// A share grant as consulted by the capability check.
#[derive(Debug, Clone, Copy)]
pub struct SaveGrant {
    pub user_id: DbId,
    pub permission: i32,
    pub accepted: bool,
}

// ---------------------------------------------------------------------------
// Platform-wide privileges
// ---------------------------------------------------------------------------

fn has_view_all(role: &str) -> bool {
    role == ROLE_ADMIN
}

fn has_delete_all(role: &str) -> bool {
    role == ROLE_ADMIN
}

fn has_create(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_USER
}

// ---------------------------------------------------------------------------
// The capability gate
// ---------------------------------------------------------------------------

/// Decide whether `actor` may perform `action`.
///
/// `owner_id` is the owner of the targeted save, or `None` for actions
/// that have no target yet (`Create`, `ViewAny`). `grants` are the share
/// grants recorded for the targeted save; grants that have not been
/// accepted by the invited user widen nothing.
pub fn can_perform(
    actor: &Actor,
    action: SaveAction,
    owner_id: Option<DbId>,
    grants: &[SaveGrant],
) -> bool {
    let is_owner = owner_id == Some(actor.user_id);
    let accepted_grant = |needs_edit: bool| {
        grants.iter().any(|g| {
            g.user_id == actor.user_id
                && g.accepted
                && (!needs_edit || permission_includes_edit(g.permission))
        })
    };

    match action {
        SaveAction::ViewAny => has_view_all(&actor.role),
        SaveAction::View => is_owner || accepted_grant(false) || has_view_all(&actor.role),
        SaveAction::Create => has_create(&actor.role),
        SaveAction::Update => is_owner || accepted_grant(true),
        SaveAction::Delete => is_owner || has_delete_all(&actor.role),
        SaveAction::Share => is_owner,
    }
}

/// Like [`can_perform`], but returns `Forbidden` on a failed check so
/// handlers can bail with `?` before touching any state.
pub fn require(
    actor: &Actor,
    action: SaveAction,
    owner_id: Option<DbId>,
    grants: &[SaveGrant],
) -> Result<(), CoreError> {
    if can_perform(actor, action, owner_id, grants) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "User {} may not {}",
            actor.user_id,
            action.as_str()
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: DbId = 1;
    const GRANTEE: DbId = 2;
    const STRANGER: DbId = 3;

    fn owner() -> Actor {
        Actor::new(OWNER, ROLE_USER)
    }

    fn grantee() -> Actor {
        Actor::new(GRANTEE, ROLE_USER)
    }

    fn stranger() -> Actor {
        Actor::new(STRANGER, ROLE_USER)
    }

    fn admin() -> Actor {
        Actor::new(99, ROLE_ADMIN)
    }

    fn grant(permission: i32, accepted: bool) -> SaveGrant {
        SaveGrant {
            user_id: GRANTEE,
            permission,
            accepted,
        }
    }

    // -----------------------------------------------------------------------
    // View
    // -----------------------------------------------------------------------

    #[test]
    fn test_owner_can_view() {
        assert!(can_perform(&owner(), SaveAction::View, Some(OWNER), &[]));
    }

    #[test]
    fn test_accepted_grantee_can_view() {
        let grants = [grant(PERMISSION_READ, true)];
        assert!(can_perform(&grantee(), SaveAction::View, Some(OWNER), &grants));
    }

    #[test]
    fn test_unaccepted_grant_does_not_widen_view() {
        let grants = [grant(PERMISSION_EDIT, false)];
        assert!(!can_perform(&grantee(), SaveAction::View, Some(OWNER), &grants));
    }

    #[test]
    fn test_stranger_cannot_view() {
        let grants = [grant(PERMISSION_EDIT, true)];
        assert!(!can_perform(&stranger(), SaveAction::View, Some(OWNER), &grants));
    }

    #[test]
    fn test_admin_views_anything() {
        assert!(can_perform(&admin(), SaveAction::View, Some(OWNER), &[]));
        assert!(can_perform(&admin(), SaveAction::ViewAny, None, &[]));
    }

    #[test]
    fn test_regular_user_lacks_view_any() {
        assert!(!can_perform(&owner(), SaveAction::ViewAny, None, &[]));
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    #[test]
    fn test_any_authenticated_role_can_create() {
        assert!(can_perform(&stranger(), SaveAction::Create, None, &[]));
        assert!(can_perform(&admin(), SaveAction::Create, None, &[]));
    }

    #[test]
    fn test_unknown_role_cannot_create() {
        let actor = Actor::new(7, "spectator");
        assert!(!can_perform(&actor, SaveAction::Create, None, &[]));
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    #[test]
    fn test_owner_can_update() {
        assert!(can_perform(&owner(), SaveAction::Update, Some(OWNER), &[]));
    }

    #[test]
    fn test_edit_grant_allows_update_once_accepted() {
        let pending = [grant(PERMISSION_EDIT, false)];
        assert!(!can_perform(&grantee(), SaveAction::Update, Some(OWNER), &pending));

        let accepted = [grant(PERMISSION_EDIT, true)];
        assert!(can_perform(&grantee(), SaveAction::Update, Some(OWNER), &accepted));
    }

    #[test]
    fn test_read_grant_does_not_allow_update() {
        let grants = [grant(PERMISSION_READ, true)];
        assert!(!can_perform(&grantee(), SaveAction::Update, Some(OWNER), &grants));
    }

    #[test]
    fn test_admin_role_alone_does_not_allow_update() {
        // The platform-wide privileges cover viewing and deleting, not
        // editing someone else's save content.
        assert!(!can_perform(&admin(), SaveAction::Update, Some(OWNER), &[]));
    }

    // -----------------------------------------------------------------------
    // Delete / Share
    // -----------------------------------------------------------------------

    #[test]
    fn test_only_owner_or_admin_can_delete() {
        assert!(can_perform(&owner(), SaveAction::Delete, Some(OWNER), &[]));
        assert!(can_perform(&admin(), SaveAction::Delete, Some(OWNER), &[]));
        let grants = [grant(PERMISSION_EDIT, true)];
        assert!(!can_perform(&grantee(), SaveAction::Delete, Some(OWNER), &grants));
    }

    #[test]
    fn test_only_owner_can_share() {
        assert!(can_perform(&owner(), SaveAction::Share, Some(OWNER), &[]));
        assert!(!can_perform(&admin(), SaveAction::Share, Some(OWNER), &[]));
        let grants = [grant(PERMISSION_EDIT, true)];
        assert!(!can_perform(&grantee(), SaveAction::Share, Some(OWNER), &grants));
    }

    // -----------------------------------------------------------------------
    // require
    // -----------------------------------------------------------------------

    #[test]
    fn test_require_maps_denial_to_forbidden() {
        let err = require(&stranger(), SaveAction::Share, Some(OWNER), &[]).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn test_permission_level_helper() {
        assert!(!permission_includes_edit(PERMISSION_READ));
        assert!(permission_includes_edit(PERMISSION_EDIT));
        assert!(permission_includes_edit(PERMISSION_EDIT + 1));
    }
}
