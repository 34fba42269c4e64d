mod app;
mod capture;
mod config;
mod error;
mod feedback;
mod hooks;
mod input;
mod messages;
mod notify;
mod services;
mod session;

use app::App;
use config::Config;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays readable for the operator
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting shiprec shipment recorder");

    let config = Config::load()?;
    config.validate()?;

    let app = App::new(config).await?;
    app.run().await
}
