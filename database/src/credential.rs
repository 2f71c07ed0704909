use crate::Result;
use sqlx::{query_as, types::Json, Executor, FromRow};
use tracing::instrument;

/// An installed integration for a user
#[derive(Clone, Debug, FromRow)]
pub struct Credential {
    /// A unique ID
    pub id: i32,
    /// The user the integration was installed for
    pub user_id: i32,
    /// The slug of the installed app, i.e. `zoom`
    pub app_slug: String,
    /// The integration kind, i.e. `zoom_video`
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Provider-specific keys and tokens
    pub key: Json<serde_json::Value>,
    /// Set when the provider rejected the stored keys
    pub invalid: bool,
}

impl Credential {
    /// Get all the integrations a user has installed
    #[instrument(name = "Credential::for_user", skip(db))]
    pub async fn for_user<'c, 'e, E>(user_id: i32, db: E) -> Result<Vec<Credential>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let credentials = query_as::<_, Credential>(
            "SELECT id, user_id, app_slug, type, key, invalid FROM credentials WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(credentials)
    }
}
