use crate::{sso, state::FrontendUrl};
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{error, warn};
use url::Url;

/// Signing in failed, the user is sent to the frontend's error page
#[derive(Debug)]
pub(crate) struct SignInFailed {
    error: sso::Error,
    redirect_to: Url,
}

impl SignInFailed {
    pub fn new(error: sso::Error, frontend_url: &FrontendUrl) -> Self {
        let redirect_to = frontend_url.auth_error(error.kind());
        Self { error, redirect_to }
    }
}

impl IntoResponse for SignInFailed {
    fn into_response(self) -> Response {
        use std::error::Error;

        let error = self.error;
        match &error {
            sso::Error::MissingCode | sso::Error::UnknownUser(_) => {
                warn!(%error, "sign in rejected")
            }
            _ => match error.source() {
                Some(source) => error!(%error, %source, "failed to sign in"),
                None => error!(%error, "failed to sign in"),
            },
        }

        Redirect::to(self.redirect_to.as_str()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::SignInFailed;
    use crate::{sso, state::FrontendUrl};
    use axum::{
        http::{header::LOCATION, StatusCode},
        response::IntoResponse,
    };
    use url::Url;

    #[test]
    fn failures_redirect_to_the_error_page() {
        let frontend = FrontendUrl::new(Url::parse("http://localhost:3000").unwrap()).unwrap();

        let response =
            SignInFailed::new(sso::Error::UnknownUser(String::from("a@b.c")), &frontend)
                .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[LOCATION],
            "http://localhost:3000/auth/error?error=AccessDenied"
        );
    }
}
