use reqwest::StatusCode;
use std::fmt::{Display, Formatter};

/// An error from the sign-in flow
#[derive(Debug)]
pub enum Error {
    /// The requested provider is not supported
    UnknownProvider(String),
    /// The callback did not include a code
    MissingCode,
    /// The returned token is an unknown type
    UnknownTokenType(String),
    /// No local user has the email the provider returned
    UnknownUser(String),
    /// Invalid response body format
    BodyParse {
        source: serde_json::Error,
        content: String,
    },
    /// An unsuccessful response was received
    Unsuccessful { status: StatusCode, content: String },
    /// Failed to read response body
    BodyRead(reqwest::Error),
    /// Error while connecting to the identity provider
    Connection(reqwest::Error),
    /// An unknown error occurred
    Unknown(reqwest::Error),
    /// A database error
    Database(database::Error),
}

impl Error {
    /// The error identifier shown by the frontend's error page
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownProvider(_) => "OAuthSignin",
            Self::UnknownUser(_) => "AccessDenied",
            Self::Database(_) => "Callback",
            _ => "OAuthCallback",
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BodyRead(e) | Self::Connection(e) | Self::Unknown(e) => Some(e),
            Self::BodyParse { source, .. } => Some(source),
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProvider(provider) => write!(f, "unknown provider {provider:?}"),
            Self::MissingCode => write!(f, "missing authorization code"),
            Self::UnknownTokenType(token) => write!(f, "unknown token type {token:?}"),
            Self::UnknownUser(email) => write!(f, "no user with email {email:?}"),
            Self::BodyParse { content, .. } => write!(f, "failed to parse body: {content:?}"),
            Self::Unsuccessful { status, content } => {
                write!(f, "unsuccessful response ({status}): {content:?}")
            }
            Self::BodyRead(_) => write!(f, "failed to read response body"),
            Self::Connection(_) => write!(f, "error while connecting to identity provider"),
            Self::Unknown(_) => write!(f, "an unknown error occurred"),
            Self::Database(_) => write!(f, "unexpected database error"),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Error::Connection(error)
        } else if error.is_body() || error.is_decode() {
            Error::BodyRead(error)
        } else {
            Error::Unknown(error)
        }
    }
}

impl From<database::Error> for Error {
    fn from(error: database::Error) -> Self {
        Self::Database(error)
    }
}
