use payments::{Payer, PaymentInfo, PaymentProvider, PaymentReference};
use tracing::{error, info, instrument};

/// Charge for an event type, returning the provider's reference on success
///
/// Failures are logged and reported as `None`. Undoing any persisted state is up to the caller.
#[instrument(
    name = "payment::charge",
    skip_all,
    fields(event_type.id = info.id, amount = info.amount, currency = info.currency)
)]
pub async fn charge(
    provider: &dyn PaymentProvider,
    info: &PaymentInfo<'_>,
    payer_email: &str,
    payer_username: &str,
) -> Option<PaymentReference> {
    let payer = Payer {
        email: payer_email,
        username: payer_username,
    };

    match provider.charge(info, &payer).await {
        Ok(reference) => {
            info!(%reference, "payment created");
            Some(reference)
        }
        Err(e) => {
            error!(error = %e, source = ?std::error::Error::source(&e), "failed to create payment");
            None
        }
    }
}
