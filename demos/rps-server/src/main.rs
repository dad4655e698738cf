use roshambo::prelude::*;

/// Listen address override.
const BIND_VAR: &str = "ROSHAMBO_BIND";
/// Match length override.
const WINNING_POINTS_VAR: &str = "ROSHAMBO_WINNING_POINTS";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Builds the server configuration from `lookup` (the process environment
/// in `main`). Unset variables keep their defaults; unusable values are
/// logged and ignored.
fn config_from(lookup: impl Fn(&str) -> Option<String>) -> ServerConfig {
    let mut config = ServerConfig::default();

    if let Some(addr) = lookup(BIND_VAR) {
        config.bind_addr = addr;
    }

    if let Some(raw) = lookup(WINNING_POINTS_VAR) {
        match raw.trim().parse::<u32>() {
            Ok(points) if points > 0 => config.room.winning_points = points,
            _ => tracing::warn!(
                value = %raw,
                default = config.room.winning_points,
                "ignoring invalid {WINNING_POINTS_VAR}"
            ),
        }
    }

    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info");

    let config = config_from(|key| std::env::var(key).ok());
    tracing::info!(
        addr = %config.bind_addr,
        winning_points = config.room.winning_points,
        "starting rock-paper-scissors server"
    );

    let server = RoshamboServerBuilder::from_config(config).build().await?;
    server.run().await?;
    Ok(())
}
