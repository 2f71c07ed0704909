use super::{Session, SessionState};
use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::{debug, instrument};

/// Sessions cached in Redis, keyed by their ID and expiring alongside them
#[derive(Clone)]
pub(crate) struct Store {
    cache: ConnectionManager,
}

/// The cached part of a session
#[derive(Debug, Deserialize, PartialEq, Serialize)]
struct Record {
    expiry: DateTime<Utc>,
    state: SessionState,
}

impl Store {
    pub fn new(cache: ConnectionManager) -> Self {
        Self { cache }
    }

    #[instrument(name = "session::Store::load", skip(self))]
    pub async fn load(&self, id: &str) -> Result<Option<Session>> {
        let mut cache = self.cache.clone();
        let raw = cache.get::<_, Option<String>>(key(id)).await?;

        raw.map(|raw| decode(id, &raw)).transpose()
    }

    /// Persist a session until it expires
    #[instrument(name = "session::Store::save", skip_all, fields(id = %session.id))]
    pub async fn save(&self, session: &Session) -> Result<()> {
        let ttl = (session.expiry - Utc::now()).num_seconds();
        if ttl <= 0 {
            debug!("session already expired, not saving");
            return Ok(());
        }

        let record = Record {
            expiry: session.expiry,
            state: session.state.clone(),
        };
        let value = serde_json::to_string(&record).map_err(Error::Encode)?;

        let mut cache = self.cache.clone();
        cache
            .set_ex::<_, _, ()>(key(&session.id), value, ttl as usize)
            .await?;

        Ok(())
    }
}

/// Rebuild a session from its cached record
fn decode(id: &str, raw: &str) -> Result<Session> {
    let record = serde_json::from_str::<Record>(raw).map_err(|source| Error::Corrupt {
        id: id.to_owned(),
        source,
    })?;

    Ok(Session {
        id: id.to_owned(),
        expiry: record.expiry,
        state: record.state,
        cookie_value: None,
    })
}

fn key(id: &str) -> String {
    format!("scheduler:session:{id}")
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub(crate) enum Error {
    Redis(RedisError),
    Encode(serde_json::Error),
    /// The cached record could not be read back
    Corrupt {
        id: String,
        source: serde_json::Error,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redis(_) => write!(f, "error while interacting with redis"),
            Self::Encode(_) => write!(f, "failed to encode session"),
            Self::Corrupt { id, .. } => write!(f, "cached session {id} is corrupt"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Redis(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Corrupt { source, .. } => Some(source),
        }
    }
}

impl From<RedisError> for Error {
    fn from(error: RedisError) -> Self {
        Self::Redis(error)
    }
}
