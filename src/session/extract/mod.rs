use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;

mod base;
mod user;

pub use base::{Immutable, Mutable};
pub use user::MaybeUser;

/// A rejection generated when a handler needs a session but the session layer is not installed
#[derive(Debug, Serialize)]
pub struct MissingSession {
    message: &'static str,
}

impl MissingSession {
    fn new() -> Self {
        error!("session extension missing, is session::manage installed?");
        Self {
            message: "internal server error",
        }
    }
}

impl IntoResponse for MissingSession {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
