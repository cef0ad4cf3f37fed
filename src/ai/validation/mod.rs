//! Model Response Validation
//!
//! Turns raw model text into structured JSON, repairing format damage
//! instead of rejecting the reply outright.

mod json_repair;

pub use json_repair::{JsonRepairer, Repair, Repaired, decode_object, extract_json_from_response};
