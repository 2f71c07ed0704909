use axum::{body::Body, http::Request, middleware, routing::get, Router};
use database::PgPool;
use event_types::Services;
use redis::aio::ConnectionManager as RedisConnectionManager;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;

mod handlers;
mod session;
pub mod sso;
mod state;

pub use sso::Authenticator;
pub use state::FrontendUrl;
use state::AppState;

/// Create the authenticator for logins initiated by the SAML identity provider
pub fn saml_idp(
    idp_url: &url::Url,
    client_secret_verifier: String,
    db: PgPool,
) -> eyre::Result<Arc<dyn Authenticator>> {
    let client = sso::Client::new(idp_url, client_secret_verifier, db)?;
    Ok(Arc::new(client))
}

/// Setup the routes
pub fn router(
    authenticator: Arc<dyn Authenticator>,
    cache: RedisConnectionManager,
    cookie_domain: &str,
    cookie_signing_key: &str,
    db: PgPool,
    frontend_url: FrontendUrl,
    services: Services,
) -> Router {
    let sessions = session::Manager::new(
        cache,
        cookie_domain,
        frontend_url.is_secure(),
        cookie_signing_key,
    );

    let state = AppState {
        authenticator,
        schema: graphql::schema(db.clone(), services),
        db,
        frontend_url,
    };

    Router::new()
        .route(
            "/graphql",
            get(handlers::playground).post(handlers::graphql),
        )
        .route("/auth/saml-idp", get(handlers::saml_idp_callback))
        .layer(middleware::from_fn_with_state(sessions, session::manage))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get("x-request-id")
                        .and_then(|id| id.to_str().ok())
                        .unwrap_or_default();
                    info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
