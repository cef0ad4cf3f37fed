pub mod agent;
pub mod category;
pub mod error;
pub mod report;
pub mod utils;

pub use agent::{AgentId, AgentResult, AgentResults};
pub use category::{Category, CategoryBreakdown};
pub use error::{ErrorCategory, ErrorClassifier, LlmError, Result, ResultExt, ScoreError};
pub use report::{RiskFinding, RiskImpact, ScoringReport, TeamInfo};
pub use utils::{
    as_score, json_string, json_string_or, log_filter_error, preview, round2,
};
