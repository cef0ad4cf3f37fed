//! History and Leaderboard Commands

use console::style;

use crate::cli::ui::{Output, styled_score};
use crate::cli::util::CommandContext;
use crate::types::Result;

pub fn history(limit: usize) -> Result<()> {
    let ctx = CommandContext::load_initialized()?;
    let rows = ctx.db.list_recent(limit)?;
    let out = Output::new();

    if rows.is_empty() {
        out.info("No scorings yet. Run 'pitchscore score <file>'.");
        return Ok(());
    }

    out.section("Recent scorings");
    for row in rows {
        println!(
            "  {} {} {:<24} {}",
            style(short_timestamp(&row.created_at)).dim(),
            styled_score(row.total_score),
            row.subject_id,
            style(&row.id).dim()
        );
    }
    Ok(())
}

pub fn leaderboard(limit: usize) -> Result<()> {
    let ctx = CommandContext::load_initialized()?;
    let rows = ctx.db.leaderboard(limit)?;
    let out = Output::new();

    if rows.is_empty() {
        out.info("No scorings yet. Run 'pitchscore score <file>'.");
        return Ok(());
    }

    out.section("Leaderboard");
    for (rank, row) in rows.iter().enumerate() {
        println!(
            "  {:>3}. {} {:<24} {}",
            rank + 1,
            styled_score(row.best_score),
            row.subject_id,
            style(format!(
                "{} scoring(s), last {}",
                row.scorings,
                short_timestamp(&row.last_scored_at)
            ))
            .dim()
        );
    }
    Ok(())
}

/// `2025-03-01T12:34:56.123Z` -> `2025-03-01 12:34`
fn short_timestamp(rfc3339: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_timestamp() {
        assert_eq!(
            short_timestamp("2025-03-01T12:34:56.123456789Z"),
            "2025-03-01 12:34"
        );
        assert_eq!(short_timestamp("yesterday"), "yesterday");
    }
}
