//! Summaries of streams of concatenated JSON values, built on `json-decoder`.
//!
//! Every decoded value turns into one [`ValueSummary`] line; [`Totals`] are
//! written once all inputs have been read.

mod error;
mod summary;

pub use error::CliError;
pub use summary::*;
