//! In-memory fakes of the stores and the payment provider.

use crate::{Actor, EventTypeStore, IntegrationStore, MembershipStore, Services};
use async_trait::async_trait;
use chrono::Utc;
use database::{
    App, CreatedEventType, Credential, EventType, Json, Membership, MembershipRole, NewEventType,
    PaymentStatus, Result, SqlxError, UserMetadata,
};
use payments::{Payer, PaymentInfo, PaymentProvider, PaymentReference};
use sqlx::error::{DatabaseError, ErrorKind};
use std::{
    fmt::{Display, Formatter},
    sync::{Arc, Mutex},
};
use uuid::Uuid;

#[derive(Default)]
struct State {
    event_types: Vec<EventType>,
    hosts: Vec<(i32, i32)>,
    deleted: Vec<i32>,
    memberships: Vec<Membership>,
    credentials: Vec<Credential>,
    apps: Vec<App>,
    next_id: i32,
    fail_writes: bool,
    fail_mark_paid: bool,
    missed_key_lookups: usize,
}

#[derive(Default)]
pub struct FakeStore(Mutex<State>);

impl FakeStore {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    pub fn add_app(&self, app: App) {
        self.state().apps.push(app);
    }

    pub fn add_credential(&self, credential: Credential) {
        self.state().credentials.push(credential);
    }

    pub fn add_membership(&self, membership: Membership) {
        self.state().memberships.push(membership);
    }

    pub fn add_paid_event_type(&self, owner_id: i32, slug: &str) {
        let mut state = self.state();
        let mut event_type = event_type(&mut state, owner_id);
        event_type.slug = slug.to_owned();
        event_type.payment_status = PaymentStatus::Paid;
        event_type.payment_uid = Some(String::from("cs_existing"));
        state.event_types.push(event_type);
    }

    pub fn add_pending_event_type(&self, created_by: i32, key: &str, amount: i32) -> Uuid {
        let mut state = self.state();
        let mut event_type = event_type(&mut state, created_by);
        event_type.amount = amount;
        event_type.idempotency_key = Some(key.to_owned());
        let uid = event_type.uid;
        state.event_types.push(event_type);
        uid
    }

    /// Make every write fail as if the pool were exhausted
    pub fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    /// Make only recording a payment fail
    pub fn fail_mark_paid(&self) {
        self.state().fail_mark_paid = true;
    }

    /// Make the next idempotency key lookup miss, as if a concurrent insert had not committed yet
    pub fn miss_next_key_lookup(&self) {
        self.state().missed_key_lookups += 1;
    }

    pub fn event_types(&self) -> Vec<EventType> {
        self.state().event_types.clone()
    }

    pub fn hosts(&self, event_type_id: i32) -> Vec<i32> {
        self.state()
            .hosts
            .iter()
            .filter(|(id, _)| *id == event_type_id)
            .map(|(_, user_id)| *user_id)
            .collect()
    }

    pub fn deleted(&self) -> Vec<i32> {
        self.state().deleted.clone()
    }
}

fn event_type(state: &mut State, user_id: i32) -> EventType {
    state.next_id += 1;
    let now = Utc::now();

    EventType {
        id: state.next_id,
        uid: Uuid::new_v4(),
        title: String::from("Existing"),
        slug: String::new(),
        description: None,
        length: 30,
        hidden: false,
        owner_id: Some(user_id),
        team_id: None,
        scheduling_type: None,
        metadata: None,
        locations: Json(Vec::new()),
        amount: 1000,
        currency: String::from("usd"),
        payment_status: PaymentStatus::Pending,
        payment_uid: None,
        created_by: user_id,
        idempotency_key: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl EventTypeStore for FakeStore {
    async fn find_paid_by_slug(&self, owner_id: i32, slug: &str) -> Result<Option<EventType>> {
        Ok(self
            .state()
            .event_types
            .iter()
            .find(|e| e.owner_id == Some(owner_id) && e.slug == slug && e.is_paid())
            .cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        created_by: i32,
        key: &str,
    ) -> Result<Option<EventType>> {
        let mut state = self.state();
        if state.missed_key_lookups > 0 {
            state.missed_key_lookups -= 1;
            return Ok(None);
        }

        Ok(state
            .event_types
            .iter()
            .find(|e| e.created_by == created_by && e.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn create(&self, new: &NewEventType<'_>) -> Result<CreatedEventType> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(SqlxError::PoolTimedOut.into());
        }

        let duplicate_key = new.idempotency_key.is_some()
            && state.event_types.iter().any(|e| {
                e.created_by == new.created_by && e.idempotency_key.as_deref() == new.idempotency_key
            });
        if duplicate_key {
            return Err(SqlxError::Database(Box::new(UniqueViolation)).into());
        }

        let mut event_type = event_type(&mut state, new.created_by);
        event_type.uid = new.uid;
        event_type.title = new.title.to_owned();
        event_type.slug = new.slug.to_owned();
        event_type.description = new.description.map(str::to_owned);
        event_type.length = new.length;
        event_type.hidden = new.hidden;
        event_type.owner_id = new.owner_id;
        event_type.team_id = new.team_id;
        event_type.scheduling_type = new.scheduling_type;
        event_type.metadata = new.metadata.cloned().map(Json);
        event_type.locations = Json(new.locations.to_vec());
        event_type.amount = new.amount.unwrap_or_default();
        event_type.currency = new.currency.unwrap_or("usd").to_owned();
        event_type.idempotency_key = new.idempotency_key.map(str::to_owned);

        let created = CreatedEventType {
            id: event_type.id,
            amount: event_type.amount,
            currency: event_type.currency.clone(),
        };
        if let Some(host_id) = new.host_id {
            state.hosts.push((created.id, host_id));
        }
        state.event_types.push(event_type);

        Ok(created)
    }

    async fn mark_paid(&self, id: i32, payment: &PaymentReference) -> Result<()> {
        let mut state = self.state();
        if state.fail_writes || state.fail_mark_paid {
            return Err(SqlxError::PoolTimedOut.into());
        }

        let event_type = state
            .event_types
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(SqlxError::RowNotFound)?;
        event_type.payment_status = PaymentStatus::Paid;
        event_type.payment_uid = Some(payment.to_string());

        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(SqlxError::PoolTimedOut.into());
        }

        state.event_types.retain(|e| e.id != id);
        state.hosts.retain(|(event_type_id, _)| *event_type_id != id);
        state.deleted.push(id);

        Ok(())
    }
}

/// The error Postgres reports when `(created_by, idempotency_key)` is already taken
#[derive(Debug)]
struct UniqueViolation;

impl Display for UniqueViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint \"event_types_created_by_idempotency_key_key\""
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

#[async_trait]
impl MembershipStore for FakeStore {
    async fn find_accepted(&self, user_id: i32, team_id: i32) -> Result<Option<Membership>> {
        Ok(self
            .state()
            .memberships
            .iter()
            .find(|m| m.user_id == user_id && m.team_id == team_id && m.accepted)
            .cloned())
    }
}

#[async_trait]
impl IntegrationStore for FakeStore {
    async fn credentials_for_user(&self, user_id: i32) -> Result<Vec<Credential>> {
        Ok(self
            .state()
            .credentials
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_app(&self, slug: &str) -> Result<Option<App>> {
        Ok(self
            .state()
            .apps
            .iter()
            .find(|a| a.slug == slug && a.enabled)
            .cloned())
    }
}

/// A charge received by [`FakePayments`]
#[derive(Clone, Debug)]
pub struct Charge {
    pub title: String,
    pub slug: String,
    pub amount: i32,
    pub currency: String,
    pub id: i32,
    pub idempotency_key: String,
    pub email: String,
    pub username: String,
}

pub struct FakePayments {
    reference: Option<PaymentReference>,
    calls: Mutex<Vec<Charge>>,
}

impl FakePayments {
    pub fn succeeding(reference: &str) -> Self {
        Self {
            reference: Some(PaymentReference::new(reference)),
            calls: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reference: None,
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<Charge> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn charge(
        &self,
        info: &PaymentInfo<'_>,
        payer: &Payer<'_>,
    ) -> payments::Result<PaymentReference> {
        self.calls.lock().unwrap().push(Charge {
            title: info.title.to_owned(),
            slug: info.slug.to_owned(),
            amount: info.amount,
            currency: info.currency.to_owned(),
            id: info.id,
            idempotency_key: info.idempotency_key.to_owned(),
            email: payer.email.to_owned(),
            username: payer.username.to_owned(),
        });

        self.reference
            .clone()
            .ok_or(payments::Error::InvalidAmount(info.amount))
    }
}

pub fn services(store: &Arc<FakeStore>, payments: &Arc<FakePayments>) -> Services {
    Services {
        event_types: store.clone(),
        memberships: store.clone(),
        integrations: store.clone(),
        payments: payments.clone(),
    }
}

pub fn actor(id: i32) -> Actor {
    Actor {
        id,
        email: String::from("alex@example.com"),
        username: Some(String::from("alex")),
        preferences: UserMetadata::default(),
    }
}

pub fn credential(id: i32, user_id: i32, app_slug: &str) -> Credential {
    Credential {
        id,
        user_id,
        app_slug: app_slug.to_owned(),
        kind: app_slug.replace('-', "_"),
        key: Json(serde_json::json!({})),
        invalid: false,
    }
}

/// The built-in video provider, configured with an API key if one is given
pub fn daily_app(api_key: Option<&str>) -> App {
    App {
        slug: String::from("daily-video"),
        keys: api_key.map(|key| Json(serde_json::json!({ "api_key": key }))),
        enabled: true,
    }
}

pub fn membership(user_id: i32, team_id: i32, role: MembershipRole, accepted: bool) -> Membership {
    let now = Utc::now();
    Membership {
        user_id,
        team_id,
        role,
        accepted,
        created_at: now,
        updated_at: now,
    }
}
