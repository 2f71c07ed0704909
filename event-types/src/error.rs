use std::fmt::{Display, Formatter};

/// The kind of failure reported to API clients
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    Unauthorized,
    BadRequest,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest => "BAD_REQUEST",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while creating an event type
#[derive(Debug)]
pub enum CreateError {
    /// The actor is not an accepted admin or owner of the team
    Unauthorized,
    /// A field of the draft is invalid
    InvalidInput {
        field: &'static str,
        message: &'static str,
    },
    /// The actor already has a paid event type with the slug
    DuplicateSlug,
    /// The payment provider did not return a reference
    PaymentNotCreated,
    /// An unexpected database error
    Database(database::Error),
}

impl CreateError {
    /// The code reported to API clients
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::InvalidInput { .. } | Self::DuplicateSlug | Self::Database(_) => {
                ErrorCode::BadRequest
            }
            Self::PaymentNotCreated => ErrorCode::InternalServerError,
        }
    }

    /// The input field responsible for the error, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            Self::DuplicateSlug => Some("slug"),
            _ => None,
        }
    }
}

impl Display for CreateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::InvalidInput { field, message } => write!(f, "{field} {message}"),
            Self::DuplicateSlug => write!(f, "URL Slug already exists for given user."),
            Self::PaymentNotCreated => {
                write!(f, "Payment not created due to internal server error")
            }
            Self::Database(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for CreateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<database::Error> for CreateError {
    fn from(error: database::Error) -> Self {
        Self::Database(error)
    }
}
