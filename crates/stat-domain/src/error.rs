use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    /// Columna inexistente en la clasificación: condición de error de
    /// programación, no de usuario (la UI sólo ofrece columnas conocidas).
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}
