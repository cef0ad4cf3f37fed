mod output;
mod report;

pub use output::{Output, styled_score};
pub use report::{print_missing, print_report, score_bar};
