use super::{store::Store, Handle, Session};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use redis::aio::ConnectionManager as RedisConnectionManager;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, Span};

/// Attaches sessions to requests and persists them once someone signs in
///
/// Anonymous visitors never reach the cache, and never receive a cookie, unless a handler
/// changes their session's state.
#[derive(Clone)]
pub struct Manager {
    store: Store,
    settings: Arc<CookieSettings>,
}

#[derive(Debug)]
pub(crate) struct CookieSettings {
    pub domain: String,
    pub key: String,
    pub secure: bool,
}

impl Manager {
    pub fn new(
        cache: RedisConnectionManager,
        domain: &str,
        secure: bool,
        signing_key: &str,
    ) -> Self {
        Self {
            store: Store::new(cache),
            settings: Arc::new(CookieSettings {
                domain: domain.to_owned(),
                key: signing_key.to_owned(),
                secure,
            }),
        }
    }

    /// Find the session referenced by the request's cookie, or start a fresh one
    async fn load(&self, jar: &CookieJar) -> Session {
        let Some(id) = Session::from_cookie(jar, self.settings.key.as_bytes()) else {
            return Session::default();
        };

        match self.store.load(&id).await {
            Ok(Some(session)) if !session.is_expired() => session,
            Ok(_) => {
                debug!("session is missing or expired, starting a new one");
                Session::default()
            }
            Err(error) => {
                log_error(&error, "failed to load session");
                Session::default()
            }
        }
    }
}

/// Middleware body, installed with [`axum::middleware::from_fn_with_state`]
#[instrument(name = "session", skip_all, fields(state, user))]
pub async fn manage(
    State(manager): State<Manager>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next<Body>,
) -> Response {
    let session = manager.load(&jar).await;
    let initial = session.state.clone();
    Span::current()
        .record("state", initial.name())
        .record("user", initial.id());

    let handle: Handle = Arc::new(RwLock::new(session));
    req.extensions_mut().insert(handle.clone());
    let response = next.run(req).await;

    let session = handle.read().await;
    if session.state == initial {
        return response;
    }

    info!(
        id = %session.id(),
        from = initial.name(),
        to = session.state.name(),
        "session state changed"
    );
    if let Err(error) = manager.store.save(&session).await {
        log_error(&error, "failed to save session");
        return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
    }

    match session.cookie(&manager.settings) {
        Some(cookie) => (jar.add(cookie), response).into_response(),
        None => response,
    }
}

fn log_error(error: &super::store::Error, message: &'static str) {
    use std::error::Error;

    match error.source() {
        Some(source) => error!(%error, %source, "{message}"),
        None => error!(%error, "{message}"),
    }
}
