use super::{Immutable, MissingSession};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use database::{PgPool, User};
use serde::Serialize;
use tracing::{error, warn};

/// The user the session is authenticated as, if any
#[derive(Debug)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    PgPool: FromRef<S>,
{
    type Rejection = MaybeUserRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Immutable::from_request_parts(parts, state).await?;
        let Some(id) = session.state().id() else {
            return Ok(Self(None));
        };

        let db = PgPool::from_ref(state);
        let user = User::find(id, &db).await?;
        if user.is_none() {
            warn!(%id, "user specified in session does not exist");
        }

        Ok(Self(user))
    }
}

#[derive(Debug)]
pub enum MaybeUserRejection {
    /// The session layer is not installed
    MissingSession(MissingSession),
    /// An unexpected database error
    Database(database::Error),
}

#[derive(Serialize)]
struct ApiError {
    message: &'static str,
}

impl IntoResponse for MaybeUserRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingSession(rejection) => rejection.into_response(),
            Self::Database(error) => {
                use std::error::Error;

                match error.source() {
                    Some(source) => error!(%error, %source, "unexpected database error"),
                    None => error!(%error, "unexpected database error"),
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiError {
                        message: "internal server error",
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<MissingSession> for MaybeUserRejection {
    fn from(rejection: MissingSession) -> Self {
        MaybeUserRejection::MissingSession(rejection)
    }
}

impl From<database::Error> for MaybeUserRejection {
    fn from(error: database::Error) -> Self {
        MaybeUserRejection::Database(error)
    }
}
