use crate::domain::sector::SectorName;
use crate::domain::{CustomerId, Weight};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CourierError>;

#[derive(Error, Debug)]
pub enum CourierError {
    #[error("No rates for customer {customer_id} in sector '{sector}'. Add rates for this sector.")]
    RateNotFound {
        customer_id: CustomerId,
        sector: SectorName,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("Invalid weight: {0} kg")]
    InvalidWeight(Weight),
    #[error("Unknown sector: '{0}'")]
    UnknownSector(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for CourierError {
    fn from(err: rocksdb::Error) -> Self {
        CourierError::PersistenceFailure(err.to_string())
    }
}
