// Repository trait for measurement data access
use crate::domain::measurement::JoinedRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Why the measurement set could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot reach the measurement database: {0}")]
    Connection(String),

    #[error("measurement query failed: {0}")]
    Query(String),

    #[error("unexpected measurement row: {0}")]
    Decode(String),
}

#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Load every measurement joined with its station and pollutant.
    ///
    /// An empty table is `Ok(vec![])`, not an error.
    async fn load_joined_records(&self) -> Result<Vec<JoinedRecord>, LoadError>;
}
