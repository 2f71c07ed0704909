use crate::{CreateError, MembershipStore};
use database::Membership;
use tracing::{instrument, warn};

/// Whether a membership allows managing the team's event types
pub fn permits(membership: Option<&Membership>) -> bool {
    membership
        .map(|m| m.accepted && m.role.can_manage_event_types())
        .unwrap_or_default()
}

/// Ensure the actor can create event types for the team
#[instrument(name = "authorization::authorize", skip(memberships))]
pub async fn authorize(
    memberships: &dyn MembershipStore,
    actor_id: i32,
    team_id: i32,
) -> Result<(), CreateError> {
    let membership = memberships.find_accepted(actor_id, team_id).await?;

    if permits(membership.as_ref()) {
        Ok(())
    } else {
        warn!(
            user.id = actor_id,
            team.id = team_id,
            "user is not an admin or owner of the team"
        );
        Err(CreateError::Unauthorized)
    }
}
