use console::{StyledObject, style};

use crate::constants::scoring::RECOMMENDATION_THRESHOLD;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<20} {}", style(format!("{}:", label)).dim(), value);
    }

    pub fn bullet(&self, message: &str) {
        println!("  • {}", message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// Score colored by band: weak below the recommendation threshold
pub fn styled_score(score: f64) -> StyledObject<String> {
    let text = format!("{:>6.2}", score);
    if score < RECOMMENDATION_THRESHOLD {
        style(text).red()
    } else if score < 75.0 {
        style(text).yellow()
    } else {
        style(text).green()
    }
}
