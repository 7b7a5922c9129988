use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;

pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let context = crate::infrastructure::bootstrap::setup(&config)?;

    let (host, port) = config.bind_address();
    info!(host = %host, port, "Starting HTTP server");

    crate::interfaces::http::start_server(context, &config)?.await?;
    Ok(())
}
