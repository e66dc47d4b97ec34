use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

impl PaymentError {
    /// Whether the failure happened while talking to the order store.
    pub fn is_storage(&self) -> bool {
        match self {
            PaymentError::Storage(_)
            | PaymentError::Io(_)
            | PaymentError::Serialization(_)
            | PaymentError::Http(_) => true,
            #[cfg(feature = "storage-rocksdb")]
            PaymentError::RocksDb(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
