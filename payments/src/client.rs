use crate::{Error, Payer, PaymentInfo, PaymentProvider, PaymentReference, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Response,
};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Settings for the checkout API
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the provider's API
    pub api_url: Url,
    /// The secret API key
    pub secret_key: String,
    /// Where the payer lands after completing the checkout
    pub success_url: Url,
    /// Where the payer lands after abandoning the checkout
    pub cancel_url: Url,
}

/// Creates hosted checkout sessions with a Stripe-compatible API
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    sessions_url: Url,
    config: Config,
}

impl Client {
    /// Construct a new checkout client
    pub fn new(config: Config) -> Result<Self> {
        let headers = {
            let mut map = HeaderMap::new();
            map.insert(ACCEPT, HeaderValue::from_static("application/json"));
            map
        };

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .user_agent("scheduler/payments")
            .build()?;
        let sessions_url = config.api_url.join("/v1/checkout/sessions")?;

        Ok(Client {
            client,
            sessions_url,
            config,
        })
    }
}

#[async_trait]
impl PaymentProvider for Client {
    #[instrument(
        name = "Client::charge",
        skip_all,
        fields(
            event_type.id = info.id,
            amount = info.amount,
            currency = info.currency,
            idempotency_key = info.idempotency_key,
        )
    )]
    async fn charge(&self, info: &PaymentInfo<'_>, payer: &Payer<'_>) -> Result<PaymentReference> {
        if info.amount <= 0 {
            return Err(Error::InvalidAmount(info.amount));
        }

        let body = checkout_form(info, payer, &self.config);
        let response = self
            .client
            .post(self.sessions_url.clone())
            .bearer_auth(&self.config.secret_key)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("Idempotency-Key", info.idempotency_key)
            .body(body)
            .send()
            .await?;

        let session = deserialize_if_successful::<CheckoutSession>(response).await?;
        info!(session.id = %session.id, "checkout session created");

        Ok(PaymentReference::new(session.id))
    }
}

/// Build the form-encoded body of a checkout session request
fn checkout_form(info: &PaymentInfo<'_>, payer: &Payer<'_>, config: &Config) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("mode", "payment");
    params.append_pair("client_reference_id", &info.id.to_string());
    params.append_pair("customer_email", payer.email);
    params.append_pair("success_url", config.success_url.as_str());
    params.append_pair("cancel_url", config.cancel_url.as_str());
    params.append_pair("line_items[0][quantity]", "1");
    params.append_pair("line_items[0][price_data][currency]", info.currency);
    params.append_pair(
        "line_items[0][price_data][unit_amount]",
        &info.amount.to_string(),
    );
    params.append_pair("line_items[0][price_data][product_data][name]", info.title);
    params.append_pair("metadata[event_type_id]", &info.id.to_string());
    params.append_pair("metadata[slug]", info.slug);
    if !payer.username.is_empty() {
        params.append_pair("metadata[username]", payer.username);
    }

    params.finish()
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    id: String,
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
