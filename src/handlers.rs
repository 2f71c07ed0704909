use crate::{
    session::{
        extract::{MaybeUser, Mutable},
        SessionState,
    },
    sso::{self, Authenticator, CallbackCompleter, CallbackParams},
    state::FrontendUrl,
};
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use event_types::Actor;
use std::sync::Arc;
use tracing::{info, instrument};

mod error;

use error::SignInFailed;

/// Handle graphql requests, acting as the session's user if there is one
#[instrument(name = "graphql", skip_all)]
pub(crate) async fn graphql(
    State(schema): State<graphql::Schema>,
    MaybeUser(user): MaybeUser,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut req = req.into_inner();
    if let Some(user) = user {
        req = req.data(Actor::from(user));
    }

    schema.execute(req).await.into()
}

/// Serve the GraphQL playground for development
#[instrument(name = "playground")]
pub(crate) async fn playground() -> Html<String> {
    let config = GraphQLPlaygroundConfig::new("/graphql").title("Scheduler Playground");
    Html(playground_source(config))
}

/// Complete a login initiated by the SAML identity provider
#[instrument(name = "sso::callback", skip_all)]
pub(crate) async fn saml_idp_callback(
    Query(params): Query<CallbackParams>,
    State(authenticator): State<Arc<dyn Authenticator>>,
    State(frontend_url): State<FrontendUrl>,
    mut session: Mutable,
) -> Result<Redirect, SignInFailed> {
    if let Some(id) = session.state.id() {
        info!(user.id = id, "already signed in");
        return Ok(Redirect::to(sso::CALLBACK_URL));
    }

    let mut completer = CallbackCompleter::new(authenticator.as_ref());
    if let Some(result) = completer.complete(params).await {
        let signed_in = result.map_err(|error| SignInFailed::new(error, &frontend_url))?;
        session.state = SessionState::authenticated(signed_in.user_id);
    }

    Ok(Redirect::to(sso::CALLBACK_URL))
}
