use std::fmt::{Display, Formatter};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that occurred while interacting with the database
#[derive(Debug)]
pub struct Error(sqlx::Error);

impl Error {
    /// Whether the error was caused by a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        match &self.0 {
            sqlx::Error::Database(e) => e.is_unique_violation(),
            _ => false,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            sqlx::Error::RowNotFound => write!(f, "record not found"),
            sqlx::Error::PoolTimedOut => write!(f, "timed out waiting for a connection"),
            sqlx::Error::Database(e) => write!(f, "{}", e.message()),
            e => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self(error)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn row_not_found_is_not_a_unique_violation() {
        let error = Error::from(sqlx::Error::RowNotFound);
        assert!(!error.is_unique_violation());
        assert_eq!(error.to_string(), "record not found");
    }
}
