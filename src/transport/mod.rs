//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod code;
mod initiate;
mod status;
mod token;

pub use initiate::{
    InitiateOutcome, decode_initiate_payment_json_response, encode_initiate_payment_json,
};
pub use status::{decode_check_status_json_response, encode_check_status_json};
pub use token::decode_token_json_response;
