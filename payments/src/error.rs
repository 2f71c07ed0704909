use reqwest::StatusCode;
use std::fmt::{Display, Formatter};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error from the payment provider
#[derive(Debug)]
pub enum Error {
    /// The amount cannot be charged
    InvalidAmount(i32),
    /// The configured API URL cannot be used
    InvalidUrl(url::ParseError),
    /// Invalid response body format
    BodyParse {
        source: serde_json::Error,
        content: String,
    },
    /// An unsuccessful response was received
    Unsuccessful { status: StatusCode, content: String },
    /// Failed to read response body
    BodyRead(reqwest::Error),
    /// Error while connecting to the provider
    Connection(reqwest::Error),
    /// An unknown error occurred
    Unknown(reqwest::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BodyRead(e) | Self::Connection(e) | Self::Unknown(e) => Some(e),
            Self::BodyParse { source, .. } => Some(source),
            Self::InvalidUrl(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAmount(amount) => write!(f, "cannot charge an amount of {amount}"),
            Self::InvalidUrl(_) => write!(f, "invalid payment provider URL"),
            Self::BodyParse { content, .. } => write!(f, "failed to parse body: {content:?}"),
            Self::Unsuccessful { status, content } => {
                write!(f, "unsuccessful response ({status}): {content:?}")
            }
            Self::BodyRead(_) => write!(f, "failed to read response body"),
            Self::Connection(_) => write!(f, "error while connecting to the payment provider"),
            Self::Unknown(_) => write!(f, "an unknown error occurred"),
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

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::InvalidUrl(error)
    }
}
