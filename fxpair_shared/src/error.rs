use thiserror::Error;

/// Diagnostics raised while assembling a dataset.
///
/// None of these abort the process. `create_dataset` hands them back next to
/// whatever audio it managed to assemble.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("genre '{genre}' not found in the effect catalog")]
    NotFound { genre: String },

    #[error("unsupported option: {0}")]
    UnsupportedOption(String),

    #[error("insufficient data for {context}: needed {needed}, available {available}")]
    InsufficientData {
        context: String,
        needed: usize,
        available: usize,
    },

    #[error("failed to decode '{path}': {reason}")]
    Decode { path: String, reason: String },
}

impl DatasetError {
    pub fn decode(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn insufficient(context: impl Into<String>, needed: usize, available: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            needed,
            available,
        }
    }
}
