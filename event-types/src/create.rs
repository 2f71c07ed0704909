use crate::{authorization, location, payment, Actor, CreateError, Services};
use database::{EventType, Location, NewEventType, SchedulingType};
use payments::{PaymentInfo, PaymentReference};
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Duration of a booking when none is requested, in minutes
pub const DEFAULT_LENGTH: i32 = 15;

const MAX_SLUG_LENGTH: usize = 255;

/// The caller-supplied fields of a new event type
#[derive(Clone, Debug, Default)]
pub struct EventTypeDraft {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    /// Defaults to [`DEFAULT_LENGTH`]
    pub length: Option<i32>,
    pub hidden: bool,
    pub scheduling_type: Option<SchedulingType>,
    pub team_id: Option<i32>,
    pub metadata: Option<serde_json::Value>,
    /// Explicit locations, derived from the user's integrations when empty
    pub locations: Vec<Location>,
    pub amount: Option<i32>,
    pub currency: Option<String>,
    /// Deduplicates retried requests from the same user
    pub idempotency_key: Option<String>,
}

impl EventTypeDraft {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), CreateError> {
        if self.title.trim().is_empty() {
            return Err(CreateError::InvalidInput {
                field: "title",
                message: "cannot be empty",
            });
        }

        if self.slug.trim().is_empty() {
            return Err(CreateError::InvalidInput {
                field: "slug",
                message: "cannot be empty",
            });
        } else if self.slug.chars().count() > MAX_SLUG_LENGTH {
            return Err(CreateError::InvalidInput {
                field: "slug",
                message: "must be at most 255 characters",
            });
        }

        match self.amount {
            None => {
                return Err(CreateError::InvalidInput {
                    field: "amount",
                    message: "is required",
                })
            }
            Some(amount) if amount <= 0 => {
                return Err(CreateError::InvalidInput {
                    field: "amount",
                    message: "must be positive",
                })
            }
            Some(_) => {}
        }

        Ok(())
    }
}

/// The outcome of a successful creation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Created {
    pub payment_uid: PaymentReference,
}

/// A persisted event type that has not been paid for yet
#[derive(Debug)]
struct Unpaid {
    id: i32,
    uid: Uuid,
    amount: i32,
    currency: String,
}

/// Create a new event type and charge the actor for it
///
/// The event type is deleted again if the charge fails.
#[instrument(
    name = "event_types::create",
    skip_all,
    fields(actor.id = actor.id, team.id = ?draft.team_id)
)]
pub async fn create(
    services: &Services,
    actor: &Actor,
    draft: &EventTypeDraft,
) -> Result<Created, CreateError> {
    draft.validate()?;

    if let Some(key) = &draft.idempotency_key {
        if let Some(existing) = services
            .event_types
            .find_by_idempotency_key(actor.id, key)
            .await?
        {
            return resume(services, actor, draft, existing).await;
        }
    }

    let uid = Uuid::new_v4();
    let locations =
        location::resolve_for(services.integrations.as_ref(), actor, &draft.locations).await?;

    let mut new = NewEventType {
        uid,
        title: &draft.title,
        slug: &draft.slug,
        description: draft.description.as_deref(),
        length: draft.length.unwrap_or(DEFAULT_LENGTH),
        hidden: draft.hidden,
        owner_id: match draft.team_id {
            Some(_) => None,
            None => Some(actor.id),
        },
        host_id: match draft.scheduling_type {
            Some(SchedulingType::Managed) => None,
            _ => Some(actor.id),
        },
        team_id: None,
        scheduling_type: None,
        metadata: draft.metadata.as_ref(),
        locations: &locations,
        amount: draft.amount,
        currency: draft.currency.as_deref(),
        created_by: actor.id,
        idempotency_key: draft.idempotency_key.as_deref(),
    };

    if let (Some(team_id), Some(scheduling_type)) = (draft.team_id, draft.scheduling_type) {
        authorization::authorize(services.memberships.as_ref(), actor.id, team_id).await?;
        new.team_id = Some(team_id);
        new.scheduling_type = Some(scheduling_type);
    }

    if services
        .event_types
        .find_paid_by_slug(actor.id, &draft.slug)
        .await?
        .is_some()
    {
        return Err(CreateError::DuplicateSlug);
    }

    // The slug is only reserved once the event type is paid for
    new.slug = "";

    let created = match services.event_types.create(&new).await {
        Ok(created) => created,
        Err(e) if e.is_unique_violation() => {
            if let Some(key) = &draft.idempotency_key {
                // a concurrent request with the same key inserted first
                if let Some(existing) = services
                    .event_types
                    .find_by_idempotency_key(actor.id, key)
                    .await?
                {
                    return resume(services, actor, draft, existing).await;
                }
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    info!(event_type.id = created.id, %uid, "created unpaid event type");

    settle(
        services,
        actor,
        draft,
        Unpaid {
            id: created.id,
            uid,
            amount: created.amount,
            currency: created.currency,
        },
    )
    .await
}

/// Finish a request that was already seen
async fn resume(
    services: &Services,
    actor: &Actor,
    draft: &EventTypeDraft,
    existing: EventType,
) -> Result<Created, CreateError> {
    match existing.payment_uid {
        Some(reference) if existing.is_paid() => {
            info!(event_type.id = existing.id, "event type already paid for");
            Ok(Created {
                payment_uid: PaymentReference::new(reference),
            })
        }
        _ => {
            info!(event_type.id = existing.id, "resuming payment");
            let unpaid = Unpaid {
                id: existing.id,
                uid: existing.uid,
                amount: existing.amount,
                currency: existing.currency,
            };
            settle(services, actor, draft, unpaid).await
        }
    }
}

/// Charge for an unpaid event type, deleting it when no payment could be created
async fn settle(
    services: &Services,
    actor: &Actor,
    draft: &EventTypeDraft,
    unpaid: Unpaid,
) -> Result<Created, CreateError> {
    let idempotency_key = unpaid.uid.to_string();
    let info = PaymentInfo {
        title: &draft.title,
        slug: &draft.slug,
        amount: unpaid.amount,
        currency: &unpaid.currency,
        id: unpaid.id,
        idempotency_key: &idempotency_key,
    };
    let username = actor.username.as_deref().unwrap_or_default();

    let Some(reference) =
        payment::charge(services.payments.as_ref(), &info, &actor.email, username).await
    else {
        if let Err(e) = services.event_types.delete(unpaid.id).await {
            error!(error = %e, event_type.id = unpaid.id, "failed to delete unpaid event type");
        }
        return Err(CreateError::PaymentNotCreated);
    };

    // The charge exists, so the reference is returned even if it cannot be recorded. The record
    // stays pending and retrying with the same idempotency key resumes it without a new charge.
    if let Err(e) = services.event_types.mark_paid(unpaid.id, &reference).await {
        error!(
            error = %e,
            event_type.id = unpaid.id,
            %reference,
            "failed to record payment"
        );
    }

    Ok(Created {
        payment_uid: reference,
    })
}
