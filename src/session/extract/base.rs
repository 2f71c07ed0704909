use super::MissingSession;
use crate::session::{Handle, Session, SessionState};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard};

/// Find the session the middleware attached to the request
fn handle(parts: &Parts) -> Result<Handle, MissingSession> {
    parts
        .extensions
        .get::<Handle>()
        .cloned()
        .ok_or_else(MissingSession::new)
}

/// Extract an immutable session from the request extensions
#[derive(Debug)]
pub struct Immutable(OwnedRwLockReadGuard<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for Immutable
where
    S: Send + Sync,
{
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = handle(parts)?.read_owned().await;
        Ok(Self(session))
    }
}

impl Immutable {
    pub fn state(&self) -> &SessionState {
        &self.0.state
    }
}

impl std::ops::Deref for Immutable {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extract a mutable session from the request extensions
#[derive(Debug)]
pub struct Mutable(OwnedRwLockWriteGuard<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for Mutable
where
    S: Send + Sync,
{
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = handle(parts)?.write_owned().await;
        Ok(Self(session))
    }
}

impl std::ops::Deref for Mutable {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for Mutable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
