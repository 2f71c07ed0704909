use async_graphql::{Enum, InputObject, Json, SimpleObject};
use chrono::{DateTime, Utc};

/// How bookings are distributed across the hosts of a team event type
#[derive(Clone, Copy, Debug, Enum, Eq, PartialEq)]
#[graphql(remote = "database::SchedulingType")]
pub enum SchedulingType {
    RoundRobin,
    Collective,
    /// Owned by the team and copied to each member
    Managed,
}

/// Whether an event type has been paid for
#[derive(Clone, Copy, Debug, Enum, Eq, PartialEq)]
#[graphql(remote = "database::PaymentStatus")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// Where a meeting takes place
#[derive(Debug, SimpleObject)]
pub struct Location {
    /// The location kind, i.e. `integrations:daily`
    #[graphql(name = "type")]
    kind: String,
    /// A static link to join the meeting
    link: Option<String>,
}

impl From<database::Location> for Location {
    fn from(location: database::Location) -> Self {
        Self {
            kind: location.kind,
            link: location.link,
        }
    }
}

/// A meeting location to use instead of the defaults
#[derive(Debug, InputObject)]
pub struct LocationInput {
    /// The location kind, i.e. `inPerson`
    #[graphql(name = "type")]
    kind: String,
    /// A static link or address
    link: Option<String>,
}

impl From<LocationInput> for database::Location {
    fn from(input: LocationInput) -> Self {
        database::Location::with_link(input.kind, input.link)
    }
}

/// A bookable event type
#[derive(Debug, SimpleObject)]
pub struct EventType {
    id: i32,
    /// The public identifier
    uid: String,
    title: String,
    slug: String,
    description: Option<String>,
    /// Duration of a booking in minutes
    length: i32,
    hidden: bool,
    owner_id: Option<i32>,
    team_id: Option<i32>,
    scheduling_type: Option<SchedulingType>,
    metadata: Option<Json<serde_json::Value>>,
    locations: Vec<Location>,
    /// The amount charged, in the currency's minor unit
    amount: i32,
    currency: String,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<database::EventType> for EventType {
    fn from(event_type: database::EventType) -> Self {
        Self {
            id: event_type.id,
            uid: event_type.uid.to_string(),
            title: event_type.title,
            slug: event_type.slug,
            description: event_type.description,
            length: event_type.length,
            hidden: event_type.hidden,
            owner_id: event_type.owner_id,
            team_id: event_type.team_id,
            scheduling_type: event_type.scheduling_type.map(Into::into),
            metadata: event_type.metadata.map(|metadata| Json(metadata.0)),
            locations: event_type
                .locations
                .0
                .into_iter()
                .map(Location::from)
                .collect(),
            amount: event_type.amount,
            currency: event_type.currency,
            payment_status: event_type.payment_status.into(),
            created_at: event_type.created_at,
            updated_at: event_type.updated_at,
        }
    }
}
