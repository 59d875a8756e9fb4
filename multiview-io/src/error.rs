//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while reading meshes or converting models
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },
    
    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },
    
    #[error("Parse error: {message}")]
    ParseError { message: String },
    
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed { tool: String, status: String, stderr: String },
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        IoError::ParseError { message: message.into() }
    }
}

impl From<IoError> for multiview_core::Error {
    fn from(err: IoError) -> Self {
        use multiview_core::Error;

        match err {
            IoError::FileNotFound { .. } => Error::Precondition(err.to_string()),
            IoError::InvalidFormat { format } => Error::UnsupportedFormat(format),
            IoError::ParseError { message } => Error::InvalidData(message),
            IoError::ToolFailed { .. } => Error::Conversion(err.to_string()),
            IoError::Io(e) => Error::Io(e),
        }
    }
}
