use async_graphql::{Error, ErrorExtensions};
use event_types::{CreateError, ErrorCode};
use tracing::error;

/// An error raised when we do not know who the user is
#[derive(Debug)]
pub struct Unauthorized;

impl From<Unauthorized> for Error {
    fn from(_: Unauthorized) -> Self {
        Error::new("unauthorized").extend_with(|_, extensions| {
            extensions.set("code", ErrorCode::Unauthorized.as_str())
        })
    }
}

/// An event type could not be created
#[derive(Debug)]
pub struct CreateFailed(pub CreateError);

impl From<CreateFailed> for Error {
    fn from(CreateFailed(error): CreateFailed) -> Self {
        if let CreateError::Database(source) = &error {
            error!(error = %source, "database error while creating event type");
        }

        let code = error.code();
        let field = error.field();
        Error::new(error.to_string()).extend_with(|_, extensions| {
            extensions.set("code", code.as_str());
            if let Some(field) = field {
                extensions.set("field", field);
            }
        })
    }
}

/// An unexpected error while reading from the database
#[derive(Debug)]
pub struct Unexpected(pub database::Error);

impl From<Unexpected> for Error {
    fn from(Unexpected(error): Unexpected) -> Self {
        error!(%error, "unexpected database error");
        Error::new("internal server error").extend_with(|_, extensions| {
            extensions.set("code", ErrorCode::InternalServerError.as_str())
        })
    }
}
