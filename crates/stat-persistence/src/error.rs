//! Errores de persistencia.
//! Mapea errores de IO / serde a variantes semánticas del dominio de
//! persistencia, y de ahí al `StoreError` neutro del core.

use std::io;
use thiserror::Error;

use stat_core::StoreError;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("session document not found")]
    NotFound,
    #[error("permission denied: {0}")]
    Denied(String),
    #[error("corrupt session document: {0}")]
    Corrupt(String),
    #[error("transient io error: {0}")]
    TransientIo(String),
    #[error("unknown io error: {0}")]
    Unknown(String),
}

impl From<io::Error> for PersistenceError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Denied(err.to_string()),
            io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                Self::TransientIo(err.to_string())
            }
            io::ErrorKind::InvalidData => Self::Corrupt(err.to_string()),
            _ => Self::Unknown(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Corrupt(m) => StoreError::Serialization(m),
            other => StoreError::Io(other.to_string()),
        }
    }
}
