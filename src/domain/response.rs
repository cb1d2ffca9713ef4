use crate::domain::value::{CheckoutRequestId, MerchantRequestId, ResponseCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatePaymentResponse {
    pub checkout_request_id: CheckoutRequestId,
    pub merchant_request_id: Option<MerchantRequestId>,
    pub response_code: ResponseCode,
    pub response_description: Option<String>,
    pub customer_message: Option<String>,
}

/// Outcome of a single status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Confirmed,
    Pending,
}

impl PaymentStatus {
    pub fn is_confirmed(self) -> bool {
        self == Self::Confirmed
    }
}

impl From<bool> for PaymentStatus {
    fn from(success: bool) -> Self {
        if success {
            Self::Confirmed
        } else {
            Self::Pending
        }
    }
}

/// OAuth access token issued by the gateway's token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
