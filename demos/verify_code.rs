use std::io;

use mpesa_verify::Callbacks;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let code = std::env::args().nth(1).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "usage: verify_code <M-Pesa confirmation code>",
        )
    })?;

    let callbacks = Callbacks::new(
        || println!("payment confirmed"),
        |reason| println!("payment failed: {reason}"),
    );

    match callbacks.confirm_with_code(&code) {
        Ok(code) => println!("accepted code: {}", code.as_str()),
        Err(err) => println!("{err}"),
    }

    Ok(())
}
