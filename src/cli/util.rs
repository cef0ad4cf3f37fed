//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ai::{SharedProvider, create_provider};
use crate::config::{AgentConfig, AgentConfigResolver, Config, ConfigLoader, PackagedDefaults};
use crate::storage::{Database, SharedDatabase};
use crate::types::{Result, ScoreError};

/// Command execution context
///
/// Configuration plus the opened database. Created via `CommandContext::load()`.
#[derive(Clone)]
pub struct CommandContext {
    pub config: Config,
    pub db: SharedDatabase,
}

impl CommandContext {
    /// Load config and open (creating if needed) the configured database.
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        let db = open_database(&config.storage.database_path)?;
        Ok(Self {
            config,
            db: Arc::new(db),
        })
    }

    /// Like `load`, but fails unless `pitchscore init` has run here.
    pub fn load_initialized() -> Result<Self> {
        require_initialized()?;
        Self::load()
    }

    /// Precedence chain: active database override, packaged YAML, then the
    /// gateway settings from config.
    pub fn resolver(&self) -> AgentConfigResolver {
        AgentConfigResolver::new(AgentConfig::from_llm_defaults(&self.config.llm))
            .with_source(self.db.clone())
            .with_source(Arc::new(PackagedDefaults::new(
                self.config.scoring.agents_dir.clone(),
            )))
    }

    pub fn provider(&self) -> Result<SharedProvider> {
        create_provider(&self.config.llm)
    }
}

/// Require `.pitchscore/` to exist in the working directory
pub fn require_initialized() -> Result<PathBuf> {
    if !ConfigLoader::is_project_initialized() {
        return Err(ScoreError::NotInitialized);
    }
    Ok(ConfigLoader::project_dir())
}

/// Open and migrate a database file, creating parent directories.
pub fn open_database(path: &Path) -> Result<Database> {
    let db = Database::open(path)?;
    db.initialize()?;
    Ok(db)
}

/// Read a UTF-8 document to score. Blank documents are rejected.
pub fn read_document(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ScoreError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
    })?;
    if text.trim().is_empty() {
        return Err(ScoreError::InvalidInput(format!(
            "{} contains no text to score",
            path.display()
        )));
    }
    Ok(text)
}

/// Subject id derived from a file name (`decks/acme.md` -> `acme`)
pub fn subject_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document")
        .to_string()
}

// Tests avoid the working-directory helpers: changing the current directory
// races with parallel tests.
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_document() {
        let dir = TempDir::new().unwrap();
        let pitch = dir.path().join("acme.md");
        std::fs::write(&pitch, "# Acme\nWe build robots.").unwrap();
        assert!(read_document(&pitch).unwrap().contains("robots"));

        let blank = dir.path().join("blank.txt");
        std::fs::write(&blank, "  \n\t").unwrap();
        assert!(matches!(read_document(&blank), Err(ScoreError::InvalidInput(_))));

        let binary = dir.path().join("deck.pdf");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        assert!(matches!(read_document(&binary), Err(ScoreError::InvalidInput(_))));

        assert!(read_document(&dir.path().join("missing.md")).is_err());
    }

    #[test]
    fn test_subject_from_path() {
        assert_eq!(subject_from_path(Path::new("decks/acme.md")), "acme");
        assert_eq!(subject_from_path(Path::new("pitch")), "pitch");
        assert_eq!(subject_from_path(Path::new("/")), "document");
    }

    #[test]
    fn test_resolver_prefers_database_override() {
        let dir = TempDir::new().unwrap();
        let db = open_database(&dir.path().join("p.db")).unwrap();
        let mut config = Config::default();
        config.scoring.agents_dir = dir.path().join("agents");
        config.llm.model = "GigaChat".to_string();

        let ctx = CommandContext {
            config,
            db: Arc::new(db),
        };
        let id = crate::types::AgentId::TextAnalyzer;
        assert_eq!(ctx.resolver().resolve(id).model, "GigaChat");

        let override_config = AgentConfig {
            model: "GigaChat-Max".to_string(),
            ..AgentConfig::default()
        };
        ctx.db.upsert_agent_config(id, &override_config).unwrap();
        assert_eq!(ctx.resolver().resolve(id).model, "GigaChat-Max");
    }
}
