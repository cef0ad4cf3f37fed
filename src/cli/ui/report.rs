//! Text rendering of scoring reports

use console::style;
use serde_json::Value;

use super::output::{Output, styled_score};
use crate::analysis::MissingInfo;
use crate::types::{AgentId, ScoringReport};

const BAR_WIDTH: usize = 20;

/// Fixed-width bar for a 0-100 score
pub fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn print_report(out: &Output, report: &ScoringReport) {
    out.header(&format!("Scoring report: {}", report.subject_id));
    println!(
        "\n  Total score {}  {}",
        styled_score(report.total_score).bold(),
        style(report.scored_at.format("%Y-%m-%d %H:%M UTC")).dim()
    );

    out.section("Breakdown");
    for (category, score) in report.breakdown.iter() {
        println!(
            "  {:<20} {} {}",
            category.label(),
            styled_score(score),
            style(score_bar(score)).dim()
        );
    }

    out.section("Top risks");
    if report.risks.is_empty() {
        println!("  (none reported)");
    }
    for (i, risk) in report.risks.iter().enumerate() {
        let mut meta = Vec::new();
        if let Some(impact) = risk.impact {
            meta.push(format!("impact {}", impact.as_str()));
        }
        if let Some(p) = risk.probability {
            meta.push(format!("p={:.2}", p));
        }
        let meta = if meta.is_empty() {
            String::new()
        } else {
            format!(" {}", style(format!("({})", meta.join(", "))).dim())
        };
        println!("  {}. {}{}", i + 1, risk.description, meta);
        if let Some(mitigation) = &risk.mitigation {
            println!("     {} {}", style("→").cyan(), mitigation);
        }
    }

    out.section("Recommendations");
    for recommendation in &report.recommendations {
        out.bullet(recommendation);
    }

    if let Some(team) = &report.team_info {
        out.section("Team");
        out.field("Size", &team.team_size);
        out.field("Experience", format!("{:.1}", team.experience_level));
        if !team.key_members.is_empty() {
            out.field("Key members", join_values(&team.key_members));
        }
        if !team.team_strengths.is_empty() {
            out.field("Strengths", join_values(&team.team_strengths));
        }
        out.field("Summary", &team.details);
    }

    let degraded: Vec<AgentId> = report
        .agent_results
        .iter()
        .filter(|(_, r)| r.diagnostic.is_some() || r.details.starts_with("Agent error:"))
        .map(|(id, _)| *id)
        .collect();
    if !degraded.is_empty() {
        println!();
        out.warning(&format!(
            "Default scores used for: {}",
            degraded
                .iter()
                .map(AgentId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
}

pub fn print_missing(out: &Output, items: &[MissingInfo]) {
    if items.is_empty() {
        out.success("All key sections are mentioned");
        return;
    }
    out.section("Missing information");
    for item in items {
        println!("  {} {}", style("✗").yellow(), style(&item.description).bold());
        println!("    {}", item.recommendation);
    }
}

/// Loosely typed list entries as one line
fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            Value::Object(map) => match (map.get("name"), map.get("role")) {
                (Some(Value::String(name)), Some(Value::String(role))) => {
                    format!("{} ({})", name, role)
                }
                (Some(Value::String(name)), _) => name.clone(),
                _ => v.to_string(),
            },
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
