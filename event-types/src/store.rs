use async_trait::async_trait;
use database::{
    App, CreatedEventType, Credential, EventType, Membership, NewEventType, PgPool, Result,
};
use payments::PaymentReference;

/// Persistence for event types and their payment state
#[async_trait]
pub trait EventTypeStore: Send + Sync {
    /// Find a paid event type with the given slug owned by a user
    async fn find_paid_by_slug(&self, owner_id: i32, slug: &str) -> Result<Option<EventType>>;

    /// Find the event type a user previously created with an idempotency key
    async fn find_by_idempotency_key(&self, created_by: i32, key: &str)
        -> Result<Option<EventType>>;

    /// Persist a new event type awaiting payment
    async fn create(&self, new: &NewEventType<'_>) -> Result<CreatedEventType>;

    /// Record a successful charge
    async fn mark_paid(&self, id: i32, payment: &PaymentReference) -> Result<()>;

    async fn delete(&self, id: i32) -> Result<()>;
}

/// Read-only lookup of team memberships
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn find_accepted(&self, user_id: i32, team_id: i32) -> Result<Option<Membership>>;
}

/// Installed integrations and app-wide keys
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    async fn credentials_for_user(&self, user_id: i32) -> Result<Vec<Credential>>;

    async fn find_app(&self, slug: &str) -> Result<Option<App>>;
}

#[async_trait]
impl EventTypeStore for PgPool {
    async fn find_paid_by_slug(&self, owner_id: i32, slug: &str) -> Result<Option<EventType>> {
        EventType::find_paid_by_slug(owner_id, slug, self).await
    }

    async fn find_by_idempotency_key(
        &self,
        created_by: i32,
        key: &str,
    ) -> Result<Option<EventType>> {
        EventType::find_by_idempotency_key(created_by, key, self).await
    }

    async fn create(&self, new: &NewEventType<'_>) -> Result<CreatedEventType> {
        EventType::create(new, self).await
    }

    async fn mark_paid(&self, id: i32, payment: &PaymentReference) -> Result<()> {
        EventType::mark_paid(id, payment.as_str(), self).await
    }

    async fn delete(&self, id: i32) -> Result<()> {
        EventType::delete(id, self).await
    }
}

#[async_trait]
impl MembershipStore for PgPool {
    async fn find_accepted(&self, user_id: i32, team_id: i32) -> Result<Option<Membership>> {
        Membership::find_accepted(user_id, team_id, self).await
    }
}

#[async_trait]
impl IntegrationStore for PgPool {
    async fn credentials_for_user(&self, user_id: i32) -> Result<Vec<Credential>> {
        Credential::for_user(user_id, self).await
    }

    async fn find_app(&self, slug: &str) -> Result<Option<App>> {
        App::find_enabled(slug, self).await
    }
}
