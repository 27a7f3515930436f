//! Experiment report output
//!
//! - `text`: console report printed after the experiment
//! - `json`: machine-readable report written to a file

pub mod json;
pub mod text;
