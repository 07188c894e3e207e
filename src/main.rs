use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use trip_genie::telemetry::init_tracing;
use trip_genie::{AppConfig, Result, TripError, TripPlanner};

const DEFAULT_CONFIG: &str = "trip-genie.toml";

fn load_config() -> Result<AppConfig> {
    if let Ok(path) = std::env::var("TRIP_GENIE_CONFIG") {
        return AppConfig::from_env_or_file(path);
    }
    let fallback = PathBuf::from(DEFAULT_CONFIG);
    if fallback.exists() {
        AppConfig::from_env_or_file(fallback)
    } else {
        Ok(AppConfig::from_env())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|err| TripError::Config(format!("invalid listen address: {err}")))?;
    let planner = Arc::new(TripPlanner::from_config(&config).await?);

    trip_genie::server::serve(planner, addr).await
}
