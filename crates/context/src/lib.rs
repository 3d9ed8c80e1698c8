// context crate

mod project;
mod registry;

pub use project::{find_project_file, resolve_project_context, PROJECT_FILE_NAME};
pub use registry::load_namespace_registry;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No {0} found above the document")]
    NotFound(&'static str),
}
