use anyhow::Context;
use narutoverse::config::{ClientConfig, parse_env_lines};
use narutoverse::ui::{App, AppContext};

/// Bundled config for mobile builds (iOS/Android)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

fn load_dotenv() {
    // First try to load from .env file (desktop dev)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // Fall back to bundled config (mobile builds)
    load_bundled_config();
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if std::env::var(&key).is_err() {
            // SAFETY: We're setting env vars at startup before any threads are spawned
            unsafe {
                std::env::set_var(&key, &value);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // fail fast on a bad environment instead of silently using defaults
    let config = ClientConfig::from_env().context("invalid NarutoVerse configuration")?;

    dioxus::LaunchBuilder::new()
        .with_context(AppContext::new(config))
        .launch(App);
    Ok(())
}
