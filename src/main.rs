use anyhow::Context;
use tracing_subscriber::EnvFilter;

use voyagemind::config::VoyageMindConfig;
use voyagemind::web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = VoyageMindConfig::load().with_context(|| "Failed to load configuration")?;
    init_tracing(&config);

    tracing::info!(
        "Starting VoyageMind {} on port {}",
        voyagemind::VERSION,
        config.defaults.port
    );

    web::run(config).await
}

/// Install the global subscriber. RUST_LOG overrides the configured level.
fn init_tracing(config: &VoyageMindConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("voyagemind={}", config.logging.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
