use super::{Authenticator, Error, SignInRequest, SignedIn, PROVIDER};
use async_trait::async_trait;
use database::{PgPool, User};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

type Result<T, E = Error> = std::result::Result<T, E>;

/// IdP-initiated logins use a fixed client ID, the secret verifier authenticates us
const CLIENT_ID: &str = "dummy";

/// Signs users in through the SAML identity provider's OAuth2 bridge
#[derive(Clone)]
pub(crate) struct Client {
    client: reqwest::Client,
    token_url: Url,
    user_info_url: Url,
    client_secret: String,
    db: PgPool,
}

impl Client {
    /// Construct a new identity provider client
    pub fn new(idp_url: &Url, client_secret: String, db: PgPool) -> eyre::Result<Self> {
        let headers = {
            let mut map = HeaderMap::new();
            map.insert(ACCEPT, HeaderValue::from_static("application/json"));
            map
        };

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(5))
            .user_agent("scheduler/sso")
            .build()?;

        Ok(Client {
            client,
            token_url: idp_url.join("/api/oauth/token")?,
            user_info_url: idp_url.join("/api/oauth/userinfo")?,
            client_secret,
            db,
        })
    }

    /// Perform the access token exchange, returning a bearer token
    #[instrument(name = "Client::exchange", skip_all)]
    async fn exchange(&self, code: &str) -> Result<String> {
        let params = ExchangeRequest {
            code,
            grant_type: "authorization_code",
            client_id: CLIENT_ID,
            client_secret: &self.client_secret,
        };
        let response = self
            .client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let creds = deserialize_if_successful::<ExchangeResponse>(response).await?;

        if creds.token_type.eq_ignore_ascii_case("bearer") {
            Ok(creds.access_token)
        } else {
            Err(Error::UnknownTokenType(creds.token_type))
        }
    }

    /// Retrieve information about the current user
    #[instrument(name = "Client::user_info", skip_all)]
    async fn user_info(&self, token: &str) -> Result<UserInfo> {
        let response = self
            .client
            .get(self.user_info_url.clone())
            .bearer_auth(token)
            .send()
            .await?;

        deserialize_if_successful(response).await
    }
}

#[async_trait]
impl Authenticator for Client {
    #[instrument(name = "Client::sign_in", skip_all, fields(provider = request.provider))]
    async fn sign_in(&self, request: SignInRequest) -> Result<SignedIn> {
        if request.provider != PROVIDER {
            return Err(Error::UnknownProvider(request.provider.to_owned()));
        }
        let code = request.code.ok_or(Error::MissingCode)?;

        let token = self.exchange(&code).await?;
        let user_info = self.user_info(&token).await?;

        let user = User::find_by_email(&user_info.email, &self.db)
            .await?
            .ok_or(Error::UnknownUser(user_info.email))?;

        info!(user.id = user.id, "signed in with identity provider");
        Ok(SignedIn { user_id: user.id })
    }
}

/// Details about the authenticated user
#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
}

#[derive(Debug, Serialize)]
struct ExchangeRequest<'e> {
    code: &'e str,
    grant_type: &'e str,
    client_id: &'e str,
    client_secret: &'e str,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    access_token: String,
    token_type: String,
}

async fn deserialize_if_successful<T>(response: Response) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let content = response.text().await?;

    if status.is_success() {
        serde_json::from_str(&content).map_err(|e| Error::BodyParse { source: e, content })
    } else {
        Err(Error::Unsuccessful { status, content })
    }
}
