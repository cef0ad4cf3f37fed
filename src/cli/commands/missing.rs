//! Missing Command
//!
//! Keyword check for sections a pitch never mentions. No model calls.

use std::path::Path;

use crate::analysis::MissingInfoAnalyzer;
use crate::cli::ui::{Output, print_missing};
use crate::cli::util::read_document;
use crate::types::Result;

pub fn run(file: &Path, format: &str) -> Result<()> {
    let text = read_document(file)?;
    let missing = MissingInfoAnalyzer::new().analyze(&text);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&missing)?);
    } else {
        print_missing(&Output::new(), &missing);
    }
    Ok(())
}
