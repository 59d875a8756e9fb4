//! Error types for multiview

use thiserror::Error;

/// Main error type for multiview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    /// A caller-supplied input was rejected before any resource was acquired
    #[error("Precondition failed: {0}")]
    Precondition(String),
    
    /// The rendering collaborator failed to create a session, apply state or capture
    #[error("Backend error: {0}")]
    Backend(String),
    
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    
    #[error("Conversion failed: {0}")]
    Conversion(String),
}

impl Error {
    /// Whether the error was raised before any render resource was touched
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition(_))
    }
}

/// Result type alias for multiview operations
pub type Result<T> = std::result::Result<T, Error>;
