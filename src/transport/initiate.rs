use serde::Deserialize;
use serde_json::{Value, json};

use super::code::WireCode;
use crate::domain::{
    CheckoutRequestId, InitiatePayment, InitiatePaymentResponse, MerchantRequestId, ResponseCode,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing required field: {field}")]
    MissingField { field: &'static str },
}

/// Decoded initiate reply; a non-success `responseCode` is not a transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitiateOutcome {
    Accepted(InitiatePaymentResponse),
    Rejected {
        response_code: ResponseCode,
        response_description: Option<String>,
    },
}

// The gateway proxy may forward Daraja's PascalCase body verbatim, or add its
// own camelCase keys next to it. Both spellings are read; camelCase wins.
#[derive(Debug, Clone, Deserialize)]
struct InitiateJsonResponse {
    #[serde(default, rename = "checkoutRequestId")]
    checkout_request_id: Option<String>,
    #[serde(default, rename = "CheckoutRequestID")]
    daraja_checkout_request_id: Option<String>,
    #[serde(default, rename = "responseCode")]
    response_code: Option<WireCode>,
    #[serde(default, rename = "ResponseCode")]
    daraja_response_code: Option<WireCode>,
    #[serde(default, rename = "responseDescription")]
    response_description: Option<String>,
    #[serde(default, rename = "ResponseDescription")]
    daraja_response_description: Option<String>,
    #[serde(default, rename = "merchantRequestId")]
    merchant_request_id: Option<String>,
    #[serde(default, rename = "MerchantRequestID")]
    daraja_merchant_request_id: Option<String>,
    #[serde(default, rename = "customerMessage")]
    customer_message: Option<String>,
    #[serde(default, rename = "CustomerMessage")]
    daraja_customer_message: Option<String>,
}

pub fn encode_initiate_payment_json(request: &InitiatePayment) -> Value {
    json!({
        "phoneNumber": request.phone_number().normalized(),
        "amount": request.amount().value(),
    })
}

/// Decode the proxy's reply to an initiate call.
///
/// `responseCode` is required: a body without it is reported as
/// [`TransportError::MissingField`] even when a checkout id is present, so a
/// malformed proxy reply never starts a poll loop. A success code without a
/// usable checkout id is reported the same way.
pub fn decode_initiate_payment_json_response(json: &str) -> Result<InitiateOutcome, TransportError> {
    let parsed: InitiateJsonResponse = serde_json::from_str(json)?;
    let response_description = parsed
        .response_description
        .or(parsed.daraja_response_description);

    let response_code = parsed
        .response_code
        .or(parsed.daraja_response_code)
        .map(|code| ResponseCode::new(code.into_string()))
        .ok_or(TransportError::MissingField {
            field: "responseCode",
        })?;

    if !response_code.is_success() {
        return Ok(InitiateOutcome::Rejected {
            response_code,
            response_description,
        });
    }

    let checkout_request_id = parsed
        .checkout_request_id
        .or(parsed.daraja_checkout_request_id)
        .and_then(|id| CheckoutRequestId::new(id).ok())
        .ok_or(TransportError::MissingField {
            field: CheckoutRequestId::FIELD,
        })?;

    Ok(InitiateOutcome::Accepted(InitiatePaymentResponse {
        checkout_request_id,
        merchant_request_id: parsed
            .merchant_request_id
            .or(parsed.daraja_merchant_request_id)
            .and_then(|id| MerchantRequestId::new(id).ok()),
        response_code,
        response_description,
        customer_message: parsed.customer_message.or(parsed.daraja_customer_message),
    }))
}
