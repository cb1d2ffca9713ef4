use mpesa_verify::{GatewayClientBuilder, GatewayConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    let client = GatewayClientBuilder::from_config(&config).build()?;

    let token = client.generate_token().await?;
    println!("access token obtained, expires_in: {:?}", token.expires_in);

    Ok(())
}
