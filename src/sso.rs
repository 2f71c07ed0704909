//! Completes sign-ins started by the SAML identity provider.
//!
//! The identity provider redirects the browser back with a one-time `code`. The code must be handed
//! to the authenticator exactly once since exchanging it invalidates it.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};

mod client;
mod error;

pub(crate) use client::Client;
pub use error::Error;

/// The provider identifier for IdP-initiated logins
pub const PROVIDER: &str = "saml-idp";
/// Where the browser goes once signed in
pub const CALLBACK_URL: &str = "/";

/// Query parameters of the callback
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// A request to sign in with a provider
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignInRequest {
    pub provider: &'static str,
    pub callback_url: &'static str,
    /// The one-time code, passed through even when absent
    pub code: Option<String>,
}

/// A successful sign-in
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignedIn {
    /// The local user that signed in
    pub user_id: i32,
}

/// The authentication subsystem
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn sign_in(&self, request: SignInRequest) -> Result<SignedIn, Error>;
}

/// Triggers the sign-in for a single callback
///
/// One completer must be used per callback, it only ever triggers once.
pub struct CallbackCompleter<'a> {
    authenticator: &'a dyn Authenticator,
    triggered: bool,
}

impl<'a> CallbackCompleter<'a> {
    pub fn new(authenticator: &'a dyn Authenticator) -> Self {
        Self {
            authenticator,
            triggered: false,
        }
    }

    /// Hand the code to the authenticator, returning `None` if it was already triggered
    #[instrument(name = "CallbackCompleter::complete", skip_all, fields(has_code = params.code.is_some()))]
    pub async fn complete(&mut self, params: CallbackParams) -> Option<Result<SignedIn, Error>> {
        if self.triggered {
            info!("sign-in already triggered");
            return None;
        }
        self.triggered = true;

        let request = SignInRequest {
            provider: PROVIDER,
            callback_url: CALLBACK_URL,
            code: params.code,
        };
        Some(self.authenticator.sign_in(request).await)
    }
}
