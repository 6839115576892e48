//! Display helpers for the dashboard view.

pub mod format;

pub use format::{format_count, format_inr, format_percent};
