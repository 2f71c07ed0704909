use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, types::Json, Executor, FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

/// A bookable event type
#[derive(Clone, Debug, FromRow)]
pub struct EventType {
    /// A unique ID
    pub id: i32,
    /// A generated public identifier, also used to deduplicate charges
    pub uid: Uuid,
    /// Display name
    pub title: String,
    /// The URL slug
    pub slug: String,
    /// A longer description shown on the booking page
    pub description: Option<String>,
    /// Duration of a booking in minutes
    pub length: i32,
    /// Whether the event type is hidden from the profile page
    pub hidden: bool,
    /// The user that owns the event type, unset for team event types
    pub owner_id: Option<i32>,
    /// The team that owns the event type
    pub team_id: Option<i32>,
    /// How bookings are distributed across hosts
    pub scheduling_type: Option<SchedulingType>,
    /// Arbitrary metadata supplied by the client
    pub metadata: Option<Json<serde_json::Value>>,
    /// Where the meeting takes place
    pub locations: Json<Vec<Location>>,
    /// The amount due, in the currency's minor unit
    pub amount: i32,
    /// ISO-4217 currency code
    pub currency: String,
    /// Whether the event type has been paid for
    pub payment_status: PaymentStatus,
    /// The reference returned by the payment provider
    pub payment_uid: Option<String>,
    /// The user that created the event type
    pub created_by: i32,
    /// A client supplied key used to deduplicate creation requests
    pub idempotency_key: Option<String>,
    /// When the event type was first created
    pub created_at: DateTime<Utc>,
    /// When the event type was last updated
    pub updated_at: DateTime<Utc>,
}

/// How bookings are distributed across the hosts of a team event type
#[derive(Clone, Copy, Debug, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "scheduling_type", rename_all = "snake_case")]
pub enum SchedulingType {
    RoundRobin,
    Collective,
    /// Owned by the team and copied to each member, never tied to a single user
    Managed,
}

/// Where an event type's payment saga currently stands
#[derive(Clone, Copy, Debug, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Persisted, but the charge has not been confirmed
    Pending,
    Paid,
}

/// A meeting location descriptor
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Location {
    /// The location kind, i.e. `integrations:daily`
    #[serde(rename = "type")]
    pub kind: String,
    /// A static link to join the meeting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Location {
    /// Create a location without a link
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            link: None,
        }
    }

    /// Create a location with a static link
    pub fn with_link(kind: impl Into<String>, link: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            link,
        }
    }
}

/// The fields required to persist a new event type
#[derive(Clone, Debug)]
pub struct NewEventType<'n> {
    pub uid: Uuid,
    pub title: &'n str,
    pub slug: &'n str,
    pub description: Option<&'n str>,
    pub length: i32,
    pub hidden: bool,
    pub owner_id: Option<i32>,
    /// The user to connect as a host
    pub host_id: Option<i32>,
    pub team_id: Option<i32>,
    pub scheduling_type: Option<SchedulingType>,
    pub metadata: Option<&'n serde_json::Value>,
    pub locations: &'n [Location],
    /// Falls back to the column default when unset
    pub amount: Option<i32>,
    /// Falls back to the column default when unset
    pub currency: Option<&'n str>,
    pub created_by: i32,
    pub idempotency_key: Option<&'n str>,
}

/// The identity and amount due of a freshly persisted event type
#[derive(Clone, Debug, Eq, FromRow, PartialEq)]
pub struct CreatedEventType {
    pub id: i32,
    pub amount: i32,
    pub currency: String,
}

impl EventType {
    /// Get an event type by it's ID if the user can see it
    #[instrument(name = "EventType::find_visible_to", skip(db))]
    pub async fn find_visible_to<'c, 'e, E>(
        id: i32,
        user_id: i32,
        db: E,
    ) -> Result<Option<EventType>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let event_type = query_as::<_, EventType>(
            r#"
            SELECT e.* FROM event_types e
            WHERE e.id = $1 AND (
                e.created_by = $2
                OR e.owner_id = $2
                OR exists(SELECT 1 FROM event_type_hosts h WHERE h.event_type_id = e.id AND h.user_id = $2)
                OR exists(SELECT 1 FROM memberships m WHERE m.team_id = e.team_id AND m.user_id = $2 AND m.accepted)
            )
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(event_type)
    }

    /// Find a paid event type with the given slug owned by a user
    #[instrument(name = "EventType::find_paid_by_slug", skip(db))]
    pub async fn find_paid_by_slug<'c, 'e, E>(
        owner_id: i32,
        slug: &str,
        db: E,
    ) -> Result<Option<EventType>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let event_type = query_as::<_, EventType>(
            r#"
            SELECT * FROM event_types
            WHERE owner_id = $1 AND slug = $2 AND payment_status = 'paid'
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .bind(slug)
        .fetch_optional(db)
        .await?;

        Ok(event_type)
    }

    /// Find the event type a user previously created with an idempotency key
    #[instrument(name = "EventType::find_by_idempotency_key", skip(db))]
    pub async fn find_by_idempotency_key<'c, 'e, E>(
        created_by: i32,
        key: &str,
        db: E,
    ) -> Result<Option<EventType>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let event_type = query_as::<_, EventType>(
            "SELECT * FROM event_types WHERE created_by = $1 AND idempotency_key = $2",
        )
        .bind(created_by)
        .bind(key)
        .fetch_optional(db)
        .await?;

        Ok(event_type)
    }

    /// Create a new event type in the pending payment state, connecting the host if present
    #[instrument(
        name = "EventType::create",
        skip_all,
        fields(uid = %new.uid, owner_id = ?new.owner_id, team_id = ?new.team_id, host_id = ?new.host_id)
    )]
    pub async fn create(new: &NewEventType<'_>, db: &PgPool) -> Result<CreatedEventType> {
        let mut tx = db.begin().await?;

        let created = query_as::<_, CreatedEventType>(
            r#"
            INSERT INTO event_types (
                uid, title, slug, description, length, hidden, owner_id, team_id,
                scheduling_type, metadata, locations, amount, currency, created_by, idempotency_key
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, coalesce($12, 0), coalesce($13, 'usd'), $14, $15)
            RETURNING id, amount, currency
            "#,
        )
        .bind(new.uid)
        .bind(new.title)
        .bind(new.slug)
        .bind(new.description)
        .bind(new.length)
        .bind(new.hidden)
        .bind(new.owner_id)
        .bind(new.team_id)
        .bind(new.scheduling_type)
        .bind(new.metadata.map(Json))
        .bind(Json(new.locations))
        .bind(new.amount)
        .bind(new.currency)
        .bind(new.created_by)
        .bind(new.idempotency_key)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(host_id) = new.host_id {
            query("INSERT INTO event_type_hosts (event_type_id, user_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(host_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    /// Record a successful charge
    #[instrument(name = "EventType::mark_paid", skip(db))]
    pub async fn mark_paid<'c, 'e, E>(id: i32, payment_uid: &str, db: E) -> Result<()>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        query(
            r#"
            UPDATE event_types
            SET payment_status = 'paid', payment_uid = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payment_uid)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Delete an event type by it's ID
    #[instrument(name = "EventType::delete", skip(db))]
    pub async fn delete<'c, 'e, E>(id: i32, db: E) -> Result<()>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        query("DELETE FROM event_types WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Whether the event type has been paid for
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::Location;
    use serde_json::json;

    #[test]
    fn location_omits_missing_link() {
        let location = Location::new("integrations:daily");
        assert_eq!(
            serde_json::to_value(&location).unwrap(),
            json!({ "type": "integrations:daily" })
        );
    }

    #[test]
    fn location_reads_stored_descriptor() {
        let location: Location = serde_json::from_value(json!({
            "type": "integrations:zoom",
            "link": "https://zoom.us/j/123",
        }))
        .unwrap();
        assert_eq!(location.kind, "integrations:zoom");
        assert_eq!(location.link.as_deref(), Some("https://zoom.us/j/123"));
    }
}
