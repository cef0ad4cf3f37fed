//! Init Command
//!
//! Initialize pitchscore in the current directory.

use crate::cli::ui::Output;
use crate::cli::util::open_database;
use crate::config::ConfigLoader;
use crate::types::{Result, ScoreError};

pub fn run(force: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    let project_dir = root.join(ConfigLoader::project_dir());

    if project_dir.exists() && !force {
        return Err(ScoreError::Config(
            "Already initialized. Use --force to overwrite.".to_string(),
        ));
    }

    let config_path = root.join(ConfigLoader::project_config_path());
    if force && config_path.exists() {
        std::fs::remove_file(&config_path)?;
    }

    ConfigLoader::init_project(&root)?;
    let config = ConfigLoader::load()?;
    open_database(&config.storage.database_path)?;

    let out = Output::new();
    out.success("Initialized pitchscore in .pitchscore/");
    out.field("Config", config_path.display());
    out.field("Database", config.storage.database_path.display());
    println!();
    println!("Next steps:");
    println!("  1. export GIGACHAT_API_KEY=<authorization key>");
    println!("  2. pitchscore score <pitch.md>");

    Ok(())
}
