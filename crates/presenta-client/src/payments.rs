//! Card checkout: a payment intent minted by the backend, then a
//! confirmation call against the card gateway's REST API.
//!
//! The gateway is an external collaborator; this module is deliberately
//! thin glue. What matters is the error split: declines stay inline on
//! the payment form, an unreachable gateway surfaces blocker guidance.

use crate::error::{ApiError, ApiResult, PaymentError};
use crate::http::ApiClient;
use presenta_core::PackageTier;
use reqwest::Method;
use serde_json::{json, Value};

/// Card input from the checkout form. Never persisted, never logged.
#[derive(Debug, Clone)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
}

/// Billing contact attached to the confirmation.
#[derive(Debug, Clone, Default)]
pub struct BillingInfo {
    pub name: String,
    pub email: String,
    pub postal_code: String,
}

/// A confirmed payment as the journey needs it.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub intent_id: String,
    pub status: String,
}

/// `pi_123_secret_456` → `pi_123`. The gateway addresses the intent by
/// id but authorizes the call with the full secret.
fn intent_id(client_secret: &str) -> &str {
    client_secret
        .split_once("_secret")
        .map(|(id, _)| id)
        .unwrap_or(client_secret)
}

impl ApiClient {
    /// Asks the backend for a payment intent covering `tier`. Custom-
    /// priced tiers have no checkout and are rejected up front.
    pub async fn create_payment_intent(
        &self,
        tier: &PackageTier,
        address: &str,
        billing: &BillingInfo,
    ) -> ApiResult<String> {
        let amount = tier.amount_cents().ok_or_else(|| {
            ApiError::Payment(PaymentError::Setup(
                "this package is arranged through sales, not checkout".into(),
            ))
        })?;
        let body = json!({
            "amount": amount,
            "currency": "usd",
            "package_id": tier.id,
            "package_name": tier.name,
            "address": address,
            "customer_name": billing.name,
            "customer_email": billing.email,
        });
        let value = self
            .authorized(
                Method::POST,
                "/auth/payments/create-payment-intent/",
                Some(body),
            )
            .await?;
        value
            .get("client_secret")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::Payment(PaymentError::Setup(
                    "backend returned no client secret".into(),
                ))
            })
    }

    /// Confirms the intent with card details, straight against the
    /// gateway (the backend never sees the card).
    pub async fn confirm_card_payment(
        &self,
        client_secret: &str,
        card: &CardDetails,
        billing: &BillingInfo,
    ) -> ApiResult<PaymentConfirmation> {
        let key = self.publishable_key().ok_or(ApiError::Payment(
            PaymentError::Setup("payment publishable key not configured".into()),
        ))?;

        let url = format!(
            "{}/v1/payment_intents/{}/confirm",
            self.gateway_url(),
            intent_id(client_secret)
        );
        let exp_month = card.exp_month.to_string();
        let exp_year = card.exp_year.to_string();
        let form: Vec<(&str, &str)> = vec![
            ("key", key),
            ("client_secret", client_secret),
            ("payment_method_data[type]", "card"),
            ("payment_method_data[card][number]", &card.number),
            ("payment_method_data[card][exp_month]", &exp_month),
            ("payment_method_data[card][exp_year]", &exp_year),
            ("payment_method_data[card][cvc]", &card.cvc),
            ("payment_method_data[billing_details][name]", &billing.name),
            ("payment_method_data[billing_details][email]", &billing.email),
            (
                "payment_method_data[billing_details][address][postal_code]",
                &billing.postal_code,
            ),
        ];

        let response = self
            .http()
            .post(url)
            .form(&form)
            .send()
            .await
            // Any transport failure towards the gateway gets the
            // blocker guidance, matching how a filtered-out payment
            // script behaves in the browser client.
            .map_err(|_| ApiError::Payment(PaymentError::Unavailable))?;

        let value = response
            .json::<Value>()
            .await
            .map_err(|_| ApiError::Payment(PaymentError::Unavailable))?;

        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("payment was not accepted")
                .to_string();
            let kind = error.get("type").and_then(Value::as_str).unwrap_or("");
            return Err(match kind {
                "card_error" | "validation_error" => {
                    ApiError::Payment(PaymentError::Declined(message))
                }
                _ => ApiError::Payment(PaymentError::Setup(message)),
            });
        }

        let status = value
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_else(|| intent_id(client_secret))
            .to_string();
        if status != "succeeded" && status != "processing" {
            return Err(ApiError::Payment(PaymentError::Declined(format!(
                "payment ended in status \"{status}\""
            ))));
        }
        Ok(PaymentConfirmation {
            intent_id: id,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_id_strips_secret_suffix() {
        assert_eq!(intent_id("pi_3Abc_secret_xyz"), "pi_3Abc");
        assert_eq!(intent_id("opaque"), "opaque");
    }
}
