use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the purchase visualisation pipeline.
#[derive(Error, Debug)]
pub enum VisError {
    /// The input text contained nothing but whitespace.
    #[error("Input is empty")]
    EmptyInput,

    /// No header line follows the optional `sep=` directive.
    #[error("Input has no header line")]
    MissingHeader,

    /// A `sep=` directive named a separator the reader cannot split on.
    #[error("Unsupported delimiter {0:?}; expected a single ASCII character")]
    UnsupportedDelimiter(char),

    /// The delimited body could not be read.
    #[error("Failed to read delimited text: {0}")]
    Csv(#[from] csv::Error),

    /// A field could not be coerced while running in strict mode.
    #[error("Line {line}: cannot read {field} from {value:?}")]
    Coercion {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// A selected file could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The selection loop is no longer accepting files.
    #[error("Selection loop has stopped")]
    Stopped,

    /// Chart data could not be serialized.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VisError {
    /// `true` for errors that abort the run before any record is produced.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            VisError::EmptyInput
                | VisError::MissingHeader
                | VisError::UnsupportedDelimiter(_)
                | VisError::Csv(_)
        )
    }
}

/// Convenience alias used throughout the vis crates.
pub type Result<T> = std::result::Result<T, VisError>;
