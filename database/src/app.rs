use crate::Result;
use sqlx::{query_as, types::Json, Executor, FromRow};
use tracing::instrument;

/// Server-side configuration for an app from the app store
#[derive(Clone, Debug, FromRow)]
pub struct App {
    /// A unique identifier, i.e. `daily-video`
    pub slug: String,
    /// App-wide keys, i.e. API keys
    pub keys: Option<Json<serde_json::Value>>,
    /// Whether the app can be installed
    pub enabled: bool,
}

impl App {
    /// Get an enabled app by it's slug
    #[instrument(name = "App::find_enabled", skip(db))]
    pub async fn find_enabled<'c, 'e, E>(slug: &str, db: E) -> Result<Option<App>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let app = query_as::<_, App>("SELECT * FROM apps WHERE slug = $1 AND enabled")
            .bind(slug)
            .fetch_optional(db)
            .await?;

        Ok(app)
    }

    /// Get a single string key
    pub fn key(&self, name: &str) -> Option<&str> {
        self.keys.as_ref()?.get(name)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use serde_json::json;
    use sqlx::types::Json;

    #[test]
    fn key_must_be_a_string() {
        let app = App {
            slug: String::from("daily-video"),
            keys: Some(Json(json!({ "api_key": "secret", "scale_plan": false }))),
            enabled: true,
        };

        assert_eq!(app.key("api_key"), Some("secret"));
        assert_eq!(app.key("scale_plan"), None);
        assert_eq!(app.key("missing"), None);
    }
}
