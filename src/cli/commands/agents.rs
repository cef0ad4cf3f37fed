//! Agents Command
//!
//! Inspect resolved agent configuration and manage persisted overrides.
//!
//! Usage:
//!   pitchscore agents list
//!   pitchscore agents show <ID>
//!   pitchscore agents set <ID> [--model M] [--temperature T] [--max-tokens N]
//!                              [--system-prompt-file F] [--prompt-file F] [--inactive]
//!   pitchscore agents reset <ID>

use std::path::PathBuf;

use console::style;

use crate::agents::schema_for;
use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::AgentConfig;
use crate::constants::agent::ANALYSIS_PROMPT_KEY;
use crate::types::{AgentId, Result, ScoreError};

/// Changes applied by `agents set`
#[derive(Debug, Default)]
pub struct AgentOverride {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_prompt_file: Option<PathBuf>,
    pub prompt_file: Option<PathBuf>,
    pub inactive: bool,
}

impl AgentOverride {
    /// Apply on top of the currently effective configuration
    pub fn apply(&self, mut config: AgentConfig) -> Result<AgentConfig> {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ScoreError::InvalidInput(format!(
                    "temperature must be between 0.0 and 2.0, got {}",
                    temperature
                )));
            }
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 {
                return Err(ScoreError::InvalidInput(
                    "max-tokens must be greater than 0".to_string(),
                ));
            }
            config.max_tokens = max_tokens;
        }
        if let Some(path) = &self.system_prompt_file {
            config.system_prompt = std::fs::read_to_string(path)?.trim().to_string();
        }
        if let Some(path) = &self.prompt_file {
            let template = std::fs::read_to_string(path)?;
            if !template.contains("{text}") {
                return Err(ScoreError::InvalidInput(format!(
                    "{} has no {{text}} placeholder",
                    path.display()
                )));
            }
            config
                .prompts
                .insert(ANALYSIS_PROMPT_KEY.to_string(), template);
        }
        config.is_active = !self.inactive;
        Ok(config)
    }
}

fn parse_agent(id: &str) -> Result<AgentId> {
    id.parse().map_err(ScoreError::InvalidInput)
}

pub fn list() -> Result<()> {
    let ctx = CommandContext::load()?;
    let resolver = ctx.resolver();
    let out = Output::new();

    out.section("Agents");
    for id in AgentId::ALL {
        let (config, origin) = resolver.resolve_with_origin(id);
        let inactive = ctx
            .db
            .load_agent_config(id)?
            .is_some_and(|stored| !stored.config.is_active);
        println!(
            "  {:<20} {:<16} t={:<4} max={:<6} {}{}",
            id.as_str(),
            config.model,
            config.temperature,
            config.max_tokens,
            style(format!("[{}]", origin)).dim(),
            if inactive {
                style(" (inactive override)").yellow().to_string()
            } else {
                String::new()
            }
        );
    }
    Ok(())
}

pub fn show(id: &str) -> Result<()> {
    let agent = parse_agent(id)?;
    let ctx = CommandContext::load()?;
    let (config, origin) = ctx.resolver().resolve_with_origin(agent);
    let out = Output::new();

    out.header(agent.as_str());
    out.field("Source", &origin);
    out.field("Model", &config.model);
    out.field("Temperature", config.temperature);
    out.field("Max tokens", config.max_tokens);

    out.section("System prompt");
    println!("{}", config.system_prompt);

    out.section("Analysis prompt");
    match config.analysis_prompt() {
        Some(template) => println!("{}", template),
        None => {
            println!("{}", style("(built-in)").dim());
            println!("{}", schema_for(agent).default_prompt);
        }
    }
    Ok(())
}

pub fn set(id: &str, changes: AgentOverride) -> Result<()> {
    let agent = parse_agent(id)?;
    let ctx = CommandContext::load()?;

    // Start from the stored override even when inactive, else the effective config
    let base = match ctx.db.load_agent_config(agent)? {
        Some(stored) => stored.config,
        None => ctx.resolver().resolve(agent),
    };
    let config = changes.apply(base)?;
    ctx.db.upsert_agent_config(agent, &config)?;

    let out = Output::new();
    out.success(&format!("Saved override for {}", agent));
    if !config.is_active {
        out.warning("Override is inactive; packaged defaults apply until it is re-enabled");
    }
    Ok(())
}

pub fn reset(id: &str) -> Result<()> {
    let agent = parse_agent(id)?;
    let ctx = CommandContext::load()?;
    let out = Output::new();

    if ctx.db.delete_agent_config(agent)? {
        out.success(&format!("Removed override for {}", agent));
    } else {
        out.info(&format!("{} has no override", agent));
    }
    Ok(())
}
