// ui crate

pub mod batch;
pub mod reporter;

pub use batch::{validate_path, ValidateOptions};
pub use reporter::{render_json, render_text};
