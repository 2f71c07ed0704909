use crate::sso::Authenticator;
use axum::extract::FromRef;
use database::PgPool;
use std::sync::Arc;
use url::Url;

/// State passed to each request handler
#[derive(Clone)]
pub(crate) struct AppState {
    pub authenticator: Arc<dyn Authenticator>,
    pub db: PgPool,
    pub frontend_url: FrontendUrl,
    pub schema: graphql::Schema,
}

impl FromRef<AppState> for Arc<dyn Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.authenticator.clone()
    }
}

impl FromRef<AppState> for FrontendUrl {
    fn from_ref(state: &AppState) -> Self {
        state.frontend_url.clone()
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for graphql::Schema {
    fn from_ref(state: &AppState) -> Self {
        state.schema.clone()
    }
}

/// The publicly accessible URL for the frontend
#[derive(Debug, Clone)]
pub struct FrontendUrl {
    base: Arc<Url>,
    error_page: Arc<Url>,
}

impl FrontendUrl {
    pub fn new(base: Url) -> Result<Self, url::ParseError> {
        let error_page = base.join("/auth/error")?;

        Ok(Self {
            base: Arc::new(base),
            error_page: Arc::new(error_page),
        })
    }

    /// The domain cookies are issued for
    pub fn domain(&self) -> Option<&str> {
        self.base.host_str()
    }

    /// Whether the frontend is served over HTTPS
    pub fn is_secure(&self) -> bool {
        self.base.scheme() == "https"
    }

    /// Append a path to the URL
    pub fn join(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join(path)
    }

    /// The page explaining why signing in failed
    pub fn auth_error(&self, error: &str) -> Url {
        let mut url = Url::clone(&self.error_page);
        url.query_pairs_mut().append_pair("error", error);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::FrontendUrl;
    use url::Url;

    #[test]
    fn auth_errors_link_to_the_error_page() {
        let url = FrontendUrl::new(Url::parse("https://app.example.com/dashboard").unwrap()).unwrap();

        assert_eq!(
            url.auth_error("AccessDenied").as_str(),
            "https://app.example.com/auth/error?error=AccessDenied"
        );
        assert_eq!(url.domain(), Some("app.example.com"));
        assert!(url.is_secure());
    }
}
