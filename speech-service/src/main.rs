use anyhow::Result;
use speech_configuration::{load_config, setup_logging};
use speech_setup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    setup_logging(&config.logging);
    tracing::info!(address = %config.server.address(), "speech service configured");
    let app = Application::new(config).await?;
    app.run().await?;
    Ok(())
}
