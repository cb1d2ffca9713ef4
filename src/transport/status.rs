use serde::Deserialize;
use serde_json::Value;

use crate::domain::{CheckPaymentStatus, CheckoutRequestId, PaymentStatus};

#[derive(Debug, Clone, Deserialize)]
struct CheckStatusJsonResponse {
    #[serde(default)]
    success: bool,
}

pub fn encode_check_status_json(request: &CheckPaymentStatus) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(
        CheckoutRequestId::FIELD.to_owned(),
        Value::String(request.checkout_request_id().as_str().to_owned()),
    );
    Value::Object(body)
}

/// A body without `success: true` means the payment is still pending.
pub fn decode_check_status_json_response(json: &str) -> Result<PaymentStatus, serde_json::Error> {
    let parsed: CheckStatusJsonResponse = serde_json::from_str(json)?;
    Ok(PaymentStatus::from(parsed.success))
}
