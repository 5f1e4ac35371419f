use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(
        "Total percentage cannot exceed 100%. Current: {current}%, available: {available}%"
    )]
    PercentageExceeded { current: Decimal, available: Decimal },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Consorcio {0} has no unidades")]
    NoUnits(String),
    #[error("No unidades match the criteria for this aviso")]
    NoRecipients,
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl AdminError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for AdminError {
    fn from(e: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
