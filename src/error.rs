use mapsheet_render_core::RenderError;
use mapsheet_traits::{LayerError, StorageError};
use thiserror::Error;

/// Everything that can go wrong while printing or delivering a document.
///
/// `MissingField` and `InvalidConfiguration` are caller errors and carry
/// enough context to fix the request. `NotFound` is the normal outcome of
/// fetching a ticket twice.
#[derive(Error, Debug)]
pub enum PrintError {
    #[error("Missing required field '{0}'")]
    MissingField(String),

    #[error("Invalid value for '{field}': {value}")]
    InvalidConfiguration { field: String, value: String },

    #[error("Failed to render map layer '{layer}': {message}")]
    LayerFetchFailure { layer: String, message: String },

    #[error("File with id={0} unknown or already requested once")]
    NotFound(String),

    #[error("Temporary storage failed: {0}")]
    StorageFailure(#[from] StorageError),

    #[error("Rendering failed: {0}")]
    Render(RenderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrintError {
    pub fn missing(field: impl Into<String>) -> Self {
        PrintError::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, value: impl ToString) -> Self {
        PrintError::InvalidConfiguration {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Whether the error was caused by the request rather than by the system.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            PrintError::MissingField(_) | PrintError::InvalidConfiguration { .. } | PrintError::Json(_)
        )
    }
}

impl From<LayerError> for PrintError {
    fn from(e: LayerError) -> Self {
        PrintError::LayerFetchFailure {
            layer: e.layer().to_string(),
            message: e.to_string(),
        }
    }
}

// Layer failures surface under their own name even when they come back
// through a render callback.
impl From<RenderError> for PrintError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Layer(layer) => layer.into(),
            other => PrintError::Render(other),
        }
    }
}
