//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config ($XDG_CONFIG_HOME/pitchscore/config.toml)
//! 3. Project config (.pitchscore/config.toml)
//! 4. Environment variables (PITCHSCORE_* prefix)
//!
//! Environment keys name the section first, then the field:
//! `PITCHSCORE_LLM_TIMEOUT_SECS` sets `llm.timeout_secs`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, ScoreError};

const PROJECT_DIR: &str = ".pitchscore";
const ENV_PREFIX: &str = "PITCHSCORE_";

/// Config sections reachable from the environment
const ENV_SECTIONS: &[&str] = &["llm", "scoring", "storage"];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layers(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Resolution chain with explicit file locations
    pub fn load_layers(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // Only the section separator splits; field names keep their underscores
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX).map(|key| env_key(key.as_str()).into()),
        );

        let config: Config = figment
            .extract()
            .map_err(|e| ScoreError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ScoreError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory ($XDG_CONFIG_HOME/pitchscore or ~/.config/pitchscore)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("pitchscore"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(PROJECT_DIR)
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    pub fn is_project_initialized() -> bool {
        Self::project_dir().exists()
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Print config file locations
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration as TOML or JSON
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| ScoreError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the project directory with a default config.
    /// An existing config file is left untouched.
    pub fn init_project(root: &Path) -> Result<PathBuf> {
        let project_dir = root.join(PROJECT_DIR);
        fs::create_dir_all(&project_dir)?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        }

        Ok(project_dir)
    }

    fn default_project_config() -> &'static str {
        r#"# pitchscore Project Configuration
# Environment variables override these values: PITCHSCORE_<SECTION>_<FIELD>,
# e.g. PITCHSCORE_LLM_MODEL or PITCHSCORE_LLM_TIMEOUT_SECS.
# The API key is read from GIGACHAT_API_KEY or OPENAI_API_KEY.

version = "1.0"

[llm]
provider = "gigachat"
model = "GigaChat-Pro"
timeout_secs = 30
temperature = 0.7
max_tokens = 2000
accept_invalid_certs = false

[scoring]
agents_dir = "agents"

[storage]
database_path = ".pitchscore/pitchscore.db"
"#
    }
}

/// `LLM_TIMEOUT_SECS` -> `llm.timeout_secs`; keys outside a section stay top-level
fn env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{}.{}", section, field))
        })
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("config.toml");
        fs::write(
            &project,
            "[llm]\nprovider = \"openai\"\ntimeout_secs = 12\n[storage]\ndatabase_path = \"x.db\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&project).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.timeout_secs, 12);
        assert_eq!(config.llm.max_tokens, 2000);
        assert_eq!(config.storage.database_path, PathBuf::from("x.db"));
    }

    #[test]
    fn test_project_layer_wins_over_global() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(&global, "[llm]\ntemperature = 0.2\nmax_tokens = 900\n").unwrap();
        fs::write(&project, "[llm]\ntemperature = 0.4\n").unwrap();

        let config = ConfigLoader::load_layers(Some(&global), &project).unwrap();
        assert_eq!(config.llm.temperature, 0.4);
        assert_eq!(config.llm.max_tokens, 900);
    }

    #[test]
    fn test_env_key_mapping() {
        assert_eq!(env_key("LLM_MODEL"), "llm.model");
        assert_eq!(env_key("LLM_TIMEOUT_SECS"), "llm.timeout_secs");
        assert_eq!(env_key("STORAGE_DATABASE_PATH"), "storage.database_path");
        assert_eq!(env_key("SCORING_AGENTS_DIR"), "scoring.agents_dir");
        assert_eq!(env_key("VERSION"), "version");
    }

    #[test]
    fn test_env_overrides_fields_with_underscores() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PITCHSCORE_LLM_MODEL", "GigaChat-Max");
            jail.set_env("PITCHSCORE_LLM_TIMEOUT_SECS", "7");
            jail.set_env("PITCHSCORE_LLM_API_KEY", "R-access-token");
            jail.set_env("PITCHSCORE_STORAGE_DATABASE_PATH", "/tmp/scores.db");
            jail.set_env("PITCHSCORE_SCORING_AGENTS_DIR", "custom-agents");

            let config = ConfigLoader::load_layers(None, Path::new("absent.toml")).unwrap();
            assert_eq!(config.llm.model, "GigaChat-Max");
            assert_eq!(config.llm.timeout_secs, 7);
            assert_eq!(config.llm.api_key.as_deref(), Some("R-access-token"));
            assert_eq!(config.storage.database_path, PathBuf::from("/tmp/scores.db"));
            assert_eq!(config.scoring.agents_dir, PathBuf::from("custom-agents"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("config.toml");
        fs::write(&project, "[llm]\ntemperature = 3.0\n").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&project),
            Err(ScoreError::Config(_))
        ));
    }

    #[test]
    fn test_init_project_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let project_dir = ConfigLoader::init_project(dir.path()).unwrap();
        let config = ConfigLoader::load_from_file(&project_dir.join("config.toml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.scoring.agents_dir, PathBuf::from("agents"));
    }

    #[test]
    fn test_render_toml_omits_api_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("secret".to_string());
        let rendered = ConfigLoader::render(&config, false).unwrap();
        assert!(rendered.contains("[llm]"));
        assert!(!rendered.contains("secret"));
    }
}
