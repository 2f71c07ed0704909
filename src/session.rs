use axum_extra::extract::CookieJar;
use base64::prelude::{Engine, BASE64_URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::warn;

pub mod extract;
mod middleware;
mod store;

use middleware::CookieSettings;
pub use middleware::{manage, Manager};

/// A shared reference to a session
pub type Handle = Arc<RwLock<Session>>;

const COOKIE_NAME: &str = "session";

/// length of the random cookie value in bytes
const VALUE_SIZE: usize = 64;
/// length of the deserialized cookie in bytes
const COOKIE_SIZE: usize = 96;
/// length of the base64 url-encoded cookie
const SERIALIZED_LENGTH: usize = 128;

/// A request session
#[derive(Debug)]
pub struct Session {
    /// The unique ID to reference the session. Derived from a blake3 hash of the `cookie_value`.
    id: String,
    /// When the session expires
    expiry: DateTime<Utc>,
    pub state: SessionState,

    /// The value stored in the cookie, only known for new sessions
    cookie_value: Option<Vec<u8>>,
}

impl Session {
    /// Generate a session ID from the value stored in the cookie
    fn compute_id(value: &[u8]) -> String {
        let hash = blake3::hash(value);
        BASE64_URL_SAFE_NO_PAD.encode(hash.as_bytes())
    }

    /// Get the session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check if the session is expired
    pub fn is_expired(&self) -> bool {
        self.expiry < Utc::now()
    }

    /// Build the session cookie, only possible for sessions started by this request
    fn cookie(&self, settings: &CookieSettings) -> Option<Cookie<'static>> {
        let mut data = Vec::with_capacity(COOKIE_SIZE);
        data.extend_from_slice(self.cookie_value.as_deref()?);

        let mut mac = Hmac::<Sha256>::new_from_slice(settings.key.as_bytes()).ok()?;
        mac.update(&data);
        data.extend_from_slice(&mac.finalize().into_bytes());

        let expiry = OffsetDateTime::from_unix_timestamp(self.expiry.timestamp()).ok()?;
        let max_age = expiry - OffsetDateTime::now_utc();

        Some(
            Cookie::build(COOKIE_NAME, BASE64_URL_SAFE_NO_PAD.encode(data))
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(settings.secure)
                .domain(settings.domain.clone())
                .expires(expiry)
                .max_age(max_age)
                .path("/")
                .finish(),
        )
    }

    /// Get the session's ID from the cookie, validating the signature
    fn from_cookie(jar: &CookieJar, signing_key: &[u8]) -> Option<String> {
        let cookie = jar.get(COOKIE_NAME)?;
        let signed_value = cookie.value();

        if signed_value.len() != SERIALIZED_LENGTH {
            warn!(length = signed_value.len(), "invalid session cookie length");
            return None;
        }

        let mut data = Vec::with_capacity(COOKIE_SIZE);
        BASE64_URL_SAFE_NO_PAD
            .decode_vec(signed_value, &mut data)
            .ok()?;

        let (value, signature) = data.split_at(VALUE_SIZE);

        let mut mac = Hmac::<Sha256>::new_from_slice(signing_key).ok()?;
        mac.update(value);
        if mac.verify_slice(signature).is_err() {
            warn!("invalid session cookie signature");
            return None;
        }

        Some(Self::compute_id(value))
    }
}

impl Default for Session {
    fn default() -> Self {
        let mut cookie_value = vec![0; VALUE_SIZE];
        rand::thread_rng().fill_bytes(&mut cookie_value);

        Self {
            id: Self::compute_id(&cookie_value),
            expiry: Utc::now() + Duration::days(14),
            state: SessionState::default(),
            cookie_value: Some(cookie_value),
        }
    }
}

/// The authentication states a user can be in
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum SessionState {
    /// User is not logged in (anonymous)
    #[default]
    Unauthenticated,
    /// User is authenticated
    Authenticated(AuthenticatedState),
}

impl SessionState {
    /// Get the name of the state
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated(_) => "authenticated",
        }
    }

    /// Get the ID of the user
    pub fn id(&self) -> Option<i32> {
        match self {
            Self::Authenticated(state) => Some(state.id),
            Self::Unauthenticated => None,
        }
    }

    /// Construct a new authenticated state
    pub(crate) fn authenticated(id: i32) -> Self {
        Self::Authenticated(AuthenticatedState { id })
    }
}

/// Associated data for an authenticated user
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AuthenticatedState {
    /// The user's ID
    pub id: i32,
}
