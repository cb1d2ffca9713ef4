use crate::domain::value::{Amount, CheckoutRequestId, RawPhoneNumber};

/// STK push request: ask the gateway to prompt `phone_number` for `amount`.
///
/// Consumed once by the initiate call; build a new value for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatePayment {
    phone_number: RawPhoneNumber,
    amount: Amount,
}

impl InitiatePayment {
    pub fn new(phone_number: RawPhoneNumber, amount: Amount) -> Self {
        Self {
            phone_number,
            amount,
        }
    }

    pub fn phone_number(&self) -> &RawPhoneNumber {
        &self.phone_number
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// Status query for one previously issued checkout request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckPaymentStatus {
    checkout_request_id: CheckoutRequestId,
}

impl CheckPaymentStatus {
    pub fn new(checkout_request_id: CheckoutRequestId) -> Self {
        Self {
            checkout_request_id,
        }
    }

    pub fn checkout_request_id(&self) -> &CheckoutRequestId {
        &self.checkout_request_id
    }
}
