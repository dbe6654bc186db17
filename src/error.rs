use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum MlError {
    // Numerical errors
    SingularMatrix,

    // Model related errors
    InvalidLayerConfiguration(String),

    // Training related errors
    InvalidConfig(String),
    InvalidDataset(String),

    // File operations
    ModelLoadError(String),
    IoError(std::io::Error),
    SerializationError(Box<bincode::ErrorKind>),
    ConfigParseError(serde_json::Error),
    CsvError(csv::Error),
    PlotError(String),
}

impl fmt::Display for MlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MlError::SingularMatrix => write!(f, "Matrix is singular and cannot be decomposed"),
            MlError::InvalidLayerConfiguration(msg) => write!(f, "Invalid layer configuration: {}", msg),
            MlError::InvalidConfig(msg) => write!(f, "Invalid training configuration: {}", msg),
            MlError::InvalidDataset(msg) => write!(f, "Invalid dataset: {}", msg),
            MlError::ModelLoadError(msg) => write!(f, "Failed to load model: {}", msg),
            MlError::IoError(err) => write!(f, "I/O error: {}", err),
            MlError::SerializationError(err) => write!(f, "Serialization error: {}", err),
            MlError::ConfigParseError(err) => write!(f, "Config parse error: {}", err),
            MlError::CsvError(err) => write!(f, "CSV error: {}", err),
            MlError::PlotError(msg) => write!(f, "Plot error: {}", msg),
        }
    }
}

impl From<std::io::Error> for MlError {
    fn from(err: std::io::Error) -> MlError {
        MlError::IoError(err)
    }
}

impl From<Box<bincode::ErrorKind>> for MlError {
    fn from(err: Box<bincode::ErrorKind>) -> MlError {
        MlError::SerializationError(err)
    }
}

impl From<serde_json::Error> for MlError {
    fn from(err: serde_json::Error) -> MlError {
        MlError::ConfigParseError(err)
    }
}

impl From<csv::Error> for MlError {
    fn from(err: csv::Error) -> MlError {
        MlError::CsvError(err)
    }
}

impl Error for MlError {}

pub type Result<T> = std::result::Result<T, MlError>;
