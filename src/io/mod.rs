//! Reading and writing histories and recognition reports.

pub mod history;
pub mod report;

pub use history::{format_history, load_history, load_scenario, parse_history, write_history};
pub use report::{format_report, save_report, write_report};
