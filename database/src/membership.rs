use crate::Result;
use chrono::{DateTime, Utc};
use sqlx::{query_as, Executor, FromRow};
use tracing::instrument;

/// Maps a user to a team with a role
#[derive(Clone, Debug, Eq, FromRow, PartialEq)]
pub struct Membership {
    /// The user ID
    pub user_id: i32,
    /// The team ID
    pub team_id: i32,
    /// The user's role within the team
    pub role: MembershipRole,
    /// Whether the user accepted the invitation to the team
    pub accepted: bool,
    /// When the mapping was created
    pub created_at: DateTime<Utc>,
    /// When the mapping was last updated
    pub updated_at: DateTime<Utc>,
}

/// The roles a user can hold within a team
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipRole {
    Member,
    Admin,
    Owner,
}

impl MembershipRole {
    /// Whether the role allows managing the team's event types
    pub fn can_manage_event_types(&self) -> bool {
        matches!(self, Self::Admin | Self::Owner)
    }
}

impl Membership {
    /// Get a user's accepted membership in a team
    #[instrument(name = "Membership::find_accepted", skip(db))]
    pub async fn find_accepted<'c, 'e, E>(
        user_id: i32,
        team_id: i32,
        db: E,
    ) -> Result<Option<Membership>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let membership = query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE user_id = $1 AND team_id = $2 AND accepted",
        )
        .bind(user_id)
        .bind(team_id)
        .fetch_optional(db)
        .await?;

        Ok(membership)
    }

}

#[cfg(test)]
mod tests {
    use super::MembershipRole;

    #[test]
    fn only_admins_and_owners_manage_event_types() {
        assert!(!MembershipRole::Member.can_manage_event_types());
        assert!(MembershipRole::Admin.can_manage_event_types());
        assert!(MembershipRole::Owner.can_manage_event_types());
    }
}
