use std::io;

use mpesa_verify::{
    Callbacks, GatewayClientBuilder, GatewayConfig, Outcome, PaymentVerifier, PhoneNumber,
    PollConfig, RawPhoneNumber,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let phone = std::env::var("MPESA_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "MPESA_PHONE environment variable is required",
        )
    })?;
    let amount = std::env::var("MPESA_AMOUNT")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(500);

    // Catch typos before the customer's handset is prompted.
    let phone = RawPhoneNumber::from(PhoneNumber::parse_kenyan(phone)?);

    let config = GatewayConfig::from_env()?;
    let mut client = GatewayClientBuilder::from_config(&config).build()?;
    if config.credentials.is_some() {
        let token = client.generate_token().await?;
        client = client.with_access_token(token);
    }

    let callbacks = Callbacks::new(
        || println!("payment confirmed"),
        |reason| println!("payment failed: {reason}"),
    );
    let verifier = PaymentVerifier::new(client, callbacks, PollConfig::from_env());

    let outcome = verifier.initiate_payment(phone.raw(), amount).await;
    if outcome == Outcome::TimedOut {
        println!("enter the confirmation code from your SMS with the verify_code demo");
    }

    Ok(())
}
