use anyhow::{Context, Result};
use parking_finder::{render, FinderConfig, ParkingFinder};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();
    let config = FinderConfig::from_env()?;

    info!("🅿️  {} - {}", render::TITLE, render::TAGLINE);
    info!("Endpoint: {}", config.endpoint);

    let mut finder = ParkingFinder::from_config(&config)?;

    // Form edits come in as field=value arguments, e.g. city=Sydney parkingType=free
    for arg in std::env::args().skip(1) {
        let (name, value) = arg
            .split_once('=')
            .with_context(|| format!("Expected field=value, got `{}`", arg))?;
        finder
            .set_field(name, value)
            .with_context(|| format!("Cannot set `{}`", name))?;
    }

    let search = finder.submit();
    tokio::select! {
        joined = search => {
            if let Err(err) = joined {
                warn!("Search did not finish: {}", err);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            finder.cancel();
        }
    }

    let state = finder.state();
    println!("{}", render::render(&state));

    if state.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}
