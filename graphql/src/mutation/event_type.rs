use crate::{
    errors::{CreateFailed, Unauthorized},
    types::{LocationInput, SchedulingType},
};
use async_graphql::{Context, InputObject, Json, Object, Result, SimpleObject};
use event_types::{Actor, EventTypeDraft, Services};
use tracing::instrument;

#[derive(Default)]
pub(crate) struct EventTypeMutation;

#[Object]
impl EventTypeMutation {
    /// Create a new event type and start the payment for it
    #[instrument(name = "Mutation::create_event_type", skip(self, ctx))]
    async fn create_event_type(
        &self,
        ctx: &Context<'_>,
        input: CreateEventTypeInput,
    ) -> Result<CreateEventTypeResult> {
        let actor = ctx.data_opt::<Actor>().ok_or(Unauthorized)?;
        let services = ctx.data_unchecked::<Services>();

        let draft = EventTypeDraft::from(input);
        let created = event_types::create(services, actor, &draft)
            .await
            .map_err(CreateFailed)?;

        Ok(CreateEventTypeResult {
            payment_uid: created.payment_uid.into_inner(),
        })
    }
}

/// Input fields for creating an event type
#[derive(Debug, InputObject)]
struct CreateEventTypeInput {
    /// The display name
    title: String,
    /// The URL slug, unique among the user's paid event types
    slug: String,
    description: Option<String>,
    /// Duration of a booking in minutes, defaults to 15
    length: Option<i32>,
    #[graphql(default)]
    hidden: bool,
    /// How bookings are distributed, required alongside `teamId` for team event types
    scheduling_type: Option<SchedulingType>,
    /// The team that should own the event type
    team_id: Option<i32>,
    metadata: Option<Json<serde_json::Value>>,
    /// Where meetings take place, derived from the user's apps when empty
    #[graphql(default)]
    locations: Vec<LocationInput>,
    /// The amount to charge, in the currency's minor unit, must be positive
    amount: Option<i32>,
    /// ISO-4217 currency code to charge in, `usd` when unset
    currency: Option<String>,
    /// Makes retries of the same request safe
    idempotency_key: Option<String>,
}

impl From<CreateEventTypeInput> for EventTypeDraft {
    fn from(input: CreateEventTypeInput) -> Self {
        EventTypeDraft {
            title: input.title,
            slug: input.slug,
            description: input.description,
            length: input.length,
            hidden: input.hidden,
            scheduling_type: input.scheduling_type.map(Into::into),
            team_id: input.team_id,
            metadata: input.metadata.map(|Json(metadata)| metadata),
            locations: input.locations.into_iter().map(Into::into).collect(),
            amount: input.amount,
            currency: input.currency,
            idempotency_key: input.idempotency_key,
        }
    }
}

/// The result of creating an event type
#[derive(Debug, SimpleObject)]
struct CreateEventTypeResult {
    /// The payment provider's reference for the charge
    payment_uid: String,
}
