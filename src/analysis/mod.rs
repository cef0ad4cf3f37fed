//! Document analysis independent of scoring

mod missing_info;

pub use missing_info::{MissingInfo, MissingInfoAnalyzer, Section};
