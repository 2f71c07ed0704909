use database::{PgPool, User, UserMetadata};
use payments::PaymentProvider;
use std::sync::Arc;

pub mod apps;
pub mod authorization;
mod create;
mod error;
pub mod location;
pub mod payment;
mod store;
#[cfg(test)]
mod testing;

pub use create::{create, Created, EventTypeDraft, DEFAULT_LENGTH};
pub use error::{CreateError, ErrorCode};
pub use store::{EventTypeStore, IntegrationStore, MembershipStore};

/// The user performing an operation
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: i32,
    pub email: String,
    pub username: Option<String>,
    pub preferences: UserMetadata,
}

impl From<User> for Actor {
    fn from(user: User) -> Self {
        let preferences = user.preferences();
        Actor {
            id: user.id,
            email: user.email,
            username: user.username,
            preferences,
        }
    }
}

/// The collaborators an operation needs, passed explicitly with each call
#[derive(Clone)]
pub struct Services {
    pub event_types: Arc<dyn EventTypeStore>,
    pub memberships: Arc<dyn MembershipStore>,
    pub integrations: Arc<dyn IntegrationStore>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl Services {
    /// Back every store with the same connection pool
    pub fn postgres(db: PgPool, payments: Arc<dyn PaymentProvider>) -> Self {
        let db = Arc::new(db);
        Services {
            event_types: db.clone(),
            memberships: db.clone(),
            integrations: db,
            payments,
        }
    }
}
