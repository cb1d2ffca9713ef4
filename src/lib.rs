//! Typed client and verification orchestrator for M-Pesa STK push payments.
//!
//! The crate has a domain layer of strong types, a transport layer for wire-format
//! quirks, a small client layer that talks to the gateway, and a verifier that
//! polls the gateway until a payment is confirmed or the attempt budget runs out.
//!
//! ```rust,no_run
//! use mpesa_verify::{Callbacks, GatewayClientBuilder, GatewayConfig, PaymentVerifier, PollConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::from_env()?;
//!     let client = GatewayClientBuilder::from_config(&config).build()?;
//!     let callbacks = Callbacks::new(
//!         || println!("paid"),
//!         |reason| eprintln!("{reason}"),
//!     );
//!     let verifier = PaymentVerifier::new(client, callbacks, PollConfig::default());
//!     verifier.initiate_payment("0712345678", 500).await;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
mod transport;
pub mod verifier;

pub use client::{
    BoxFuture, Credentials, GatewayClient, GatewayClientBuilder, GatewayError, PaymentGateway,
};
pub use config::{ConfigError, GatewayConfig, PollConfig};
pub use domain::{
    AccessToken, Amount, CheckPaymentStatus, CheckoutRequestId, ConfirmationCode,
    InitiatePayment, InitiatePaymentResponse, PaymentStatus, PhoneNumber, RawPhoneNumber,
    ResponseCode, ValidationError, normalize_phone_number, validate_confirmation_code,
};
pub use verifier::{Callbacks, Outcome, PaymentVerifier, VerificationError, VerificationState};
