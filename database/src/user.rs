use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::{query_as, types::Json, Executor, FromRow};
use tracing::{instrument, warn};

/// A user of the service
#[derive(Clone, Debug, FromRow)]
pub struct User {
    /// A unique ID
    pub id: i32,
    /// The public username
    pub username: Option<String>,
    /// The user's email
    pub email: String,
    /// The display name
    pub name: Option<String>,
    /// Loosely structured preferences
    pub metadata: Option<Json<serde_json::Value>>,
}

/// Structured user preferences stored in the metadata column
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    /// The app that should provide meeting links by default
    #[serde(default)]
    pub default_conferencing_app: Option<DefaultConferencingApp>,
}

/// A user's default conferencing app preference
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultConferencingApp {
    /// The slug of the app, i.e. `zoom`
    pub app_slug: String,
    /// A static meeting link to use with the app
    #[serde(default)]
    pub app_link: Option<String>,
}

impl User {
    /// Get a user by it's ID
    #[instrument(name = "User::find", skip(db))]
    pub async fn find<'c, 'e, E>(id: i32, db: E) -> Result<Option<User>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let user = query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Get a user by it's email
    #[instrument(name = "User::find_by_email", skip(db))]
    pub async fn find_by_email<'c, 'e, E>(email: &str, db: E) -> Result<Option<User>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let user = query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Parse the user's preferences, falling back to the defaults when they are malformed
    pub fn preferences(&self) -> UserMetadata {
        let Some(raw) = &self.metadata else {
            return UserMetadata::default();
        };

        match serde_json::from_value(raw.0.clone()) {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(user.id = self.id, %error, "malformed user metadata");
                UserMetadata::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultConferencingApp, User, UserMetadata};
    use serde_json::json;
    use sqlx::types::Json;

    fn user(metadata: Option<serde_json::Value>) -> User {
        User {
            id: 1,
            username: Some(String::from("alex")),
            email: String::from("alex@example.com"),
            name: None,
            metadata: metadata.map(Json),
        }
    }

    #[test]
    fn preferences_read_default_conferencing_app() {
        let user = user(Some(json!({
            "defaultConferencingApp": { "appSlug": "zoom", "appLink": "https://zoom.us/my/alex" },
            "somethingElse": true,
        })));

        assert_eq!(
            user.preferences(),
            UserMetadata {
                default_conferencing_app: Some(DefaultConferencingApp {
                    app_slug: String::from("zoom"),
                    app_link: Some(String::from("https://zoom.us/my/alex")),
                }),
            }
        );
    }

    #[test]
    fn preferences_default_when_missing_or_malformed() {
        assert_eq!(user(None).preferences(), UserMetadata::default());
        assert_eq!(
            user(Some(json!({ "defaultConferencingApp": 42 }))).preferences(),
            UserMetadata::default()
        );
    }
}
