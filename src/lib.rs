//! pitchscore - Multi-Agent Startup Pitch Scoring
//!
//! Scores a startup pitch document with five language-model agents (text
//! quality, financials, market, team, risk), then reduces their results into
//! an eight-category breakdown, a weighted total, ranked risks and
//! recommendations.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pitchscore::{AgentConfigResolver, Config, ScoringOrchestrator, create_provider};
//!
//! let config = Config::default();
//! let provider = create_provider(&config.llm)?;
//! let orchestrator =
//!     ScoringOrchestrator::from_config(&config, &AgentConfigResolver::default(), provider);
//! let report = orchestrator.score(&pitch_text, "acme").await;
//! println!("{:.2}", report.total_score);
//! ```
//!
//! ## Modules
//!
//! - [`agents`]: the five scoring agents and their shared runner
//! - [`scoring`]: orchestration, aggregation, totals, risks, recommendations
//! - [`ai`]: language-model gateway (GigaChat, OpenAI-compatible), JSON repair
//! - [`config`]: layered configuration and per-agent precedence chain
//! - [`storage`]: SQLite persistence for overrides and reports
//! - [`analysis`]: missing-information detection

pub mod agents;
pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod scoring;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{AgentConfig, AgentConfigResolver, Config, ConfigLoader};
pub use types::error::{ErrorCategory, Result, ResultExt, ScoreError};
pub use types::{AgentId, AgentResult, Category, CategoryBreakdown, RiskFinding, ScoringReport};

pub use storage::{Database, SharedDatabase};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use agents::ScoringAgent;
pub use analysis::{MissingInfo, MissingInfoAnalyzer};
pub use scoring::ScoringOrchestrator;

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, SharedProvider, create_provider, with_timeout_map};
