//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{CheckPaymentStatus, InitiatePayment};
pub use response::{AccessToken, InitiatePaymentResponse, PaymentStatus};
pub use validation::ValidationError;
pub use value::{
    Amount, COUNTRY_CALLING_CODE, CheckoutRequestId, ConfirmationCode, ConsumerKey,
    ConsumerSecret, MerchantRequestId, PhoneNumber, RawPhoneNumber, ResponseCode, TRUNK_PREFIX,
    normalize_phone_number, validate_confirmation_code,
};
