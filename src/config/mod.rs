//! Configuration Management
//!
//! Hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config ($XDG_CONFIG_HOME/pitchscore/config.toml)
//! 3. Project config (.pitchscore/config.toml)
//! 4. Environment variables (PITCHSCORE_*)
//!
//! Per-agent settings resolve separately through [`AgentConfigResolver`].

mod agent;
mod loader;
mod types;

pub use agent::{
    AgentConfig, AgentConfigResolver, AgentConfigSource, ConfigOrigin, PackagedDefaults,
};
pub use loader::ConfigLoader;
pub use types::*;
