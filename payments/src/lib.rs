use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

mod client;
mod error;

pub use client::{Client, Config};
pub use error::{Error, Result};

/// Charges for listing an event type
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Start a charge, returning the provider's reference to it
    ///
    /// Providers must deduplicate on [`PaymentInfo::idempotency_key`] so a retried charge for
    /// the same event type returns the original reference.
    async fn charge(&self, info: &PaymentInfo<'_>, payer: &Payer<'_>) -> Result<PaymentReference>;
}

/// What is being paid for
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentInfo<'p> {
    /// The event type's display name
    pub title: &'p str,
    /// The event type's slug, as requested by the user
    pub slug: &'p str,
    /// The amount due, in the currency's minor unit
    pub amount: i32,
    /// ISO-4217 currency code of the amount
    pub currency: &'p str,
    /// The event type's ID
    pub id: i32,
    /// A stable key identifying this charge across retries
    pub idempotency_key: &'p str,
}

/// Who is paying
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payer<'p> {
    pub email: &'p str,
    /// May be empty when the user has not picked a username
    pub username: &'p str,
}

/// An opaque reference to a charge held by the provider
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    /// Wrap a provider reference
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PaymentReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
