//! Human-readable summary and JSON export of a finished run.
mod export;
mod summary;


pub use export::{export_json, metrics_json};
pub use summary::{print_summary, summary_lines};
