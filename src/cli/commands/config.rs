//! Config Command
//!
//! Usage:
//!   pitchscore config show [-f toml|json]
//!   pitchscore config path
//!   pitchscore config check

use crate::ai::create_provider;
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{Result, ScoreError};

/// Show the effective configuration (defaults, files and environment merged)
pub fn show(format: &str) -> Result<()> {
    let as_json = match format {
        "json" => true,
        "toml" | "text" => false,
        other => {
            return Err(ScoreError::InvalidInput(format!(
                "Unknown format '{}'. Valid values: toml, json",
                other
            )));
        }
    };
    let config = ConfigLoader::load()?;
    println!("{}", ConfigLoader::render(&config, as_json)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Verify the configured gateway accepts our credentials
pub async fn check() -> Result<()> {
    let config = ConfigLoader::load()?;
    let provider = create_provider(&config.llm)?;
    let out = Output::new();

    out.field("Provider", provider.name());
    out.field("Model", &config.llm.model);
    if provider.health_check().await? {
        out.success("Gateway reachable");
        Ok(())
    } else {
        Err(ScoreError::Config(format!(
            "{} gateway check failed; see log output for the cause",
            provider.name()
        )))
    }
}
