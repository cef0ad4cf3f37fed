//! Risk ranking
//!
//! The risk predictor's list comes first in its own order. Other agents that
//! happen to expose a `risks` list fill remaining slots in declared agent
//! order. Duplicates (by trimmed, case-folded description) keep their first
//! occurrence; malformed entries are skipped.

use std::collections::HashSet;

use crate::constants::scoring::MAX_RISKS;
use crate::types::{AgentId, AgentResults, RiskFinding};

pub fn rank(results: &AgentResults) -> Vec<RiskFinding> {
    let primary = results.get(&AgentId::RiskPredictor).into_iter();
    let secondary = results
        .iter()
        .filter(|(id, _)| **id != AgentId::RiskPredictor)
        .map(|(_, result)| result);

    let mut seen = HashSet::new();
    primary
        .chain(secondary)
        .filter_map(|result| result.risks())
        .flatten()
        .filter_map(RiskFinding::from_value)
        .filter(|finding| seen.insert(finding.dedup_key()))
        .take(MAX_RISKS)
        .collect()
}
