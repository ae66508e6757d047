//! Taxonomía de errores del workflow.
//!
//! Cada frontera de red tiene su enum propio (preview, inicio de pago,
//! reporte); la pérdida de datos a través del redirect es una familia aparte
//! (`SnapshotError` dentro de `WorkflowError::ReturnDataLoss`) porque indica
//! pérdida de estado del lado del cliente, no un rechazo del servidor. Los
//! enums de frontera serializan para poder viajar dentro del journal.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stat_domain::DomainError;

use crate::gate::GateViolation;

/// Falla de la operación de preview.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewError {
    #[error("preview request failed: {0}")]
    Network(String),
    #[error("preview rejected by server: {0}")]
    ServerRejected(String),
    #[error("preview response could not be decoded: {0}")]
    MalformedResponse(String),
}

/// Falla al crear la sesión de pago. No hay variante de respuesta malformada:
/// si el `url` de redirect no se puede leer, cuenta como rechazo del servidor.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentInitError {
    #[error("payment session request failed: {0}")]
    Network(String),
    #[error("payment session rejected by server: {0}")]
    ServerRejected(String),
}

/// Falla en la generación del reporte.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportError {
    #[error("report request failed: {0}")]
    Network(String),
    #[error("report rejected by server: {0}")]
    ServerRejected(String),
    #[error("report response could not be decoded: {0}")]
    MalformedResponse(String),
}

/// Error del medio de almacenamiento de sesión.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreError {
    #[error("session store io: {0}")]
    Io(String),
    #[error("session store serialization: {0}")]
    Serialization(String),
}

/// El snapshot persistido no pudo restaurarse en una forma válida.
///
/// Nunca se degrada a éxito silencioso: cualquier variante al volver de un
/// pago exitoso se reporta como pérdida de datos.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotError {
    #[error("missing session entry '{0}'")]
    MissingEntry(String),
    #[error("corrupt session snapshot: {0}")]
    Corrupt(String),
    #[error("snapshot schema version {found} (this build expects {expected})")]
    Version { found: String, expected: u32 },
    #[error("snapshot fingerprint mismatch")]
    Integrity,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error compuesto de la máquina de estados: todo lo que una operación del
/// workflow puede devolver al despachador.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    /// Precondición local de envío no cumplida. No cambia de fase.
    #[error(transparent)]
    Gate(#[from] GateViolation),
    /// Operación disparada en una fase que no la admite (re-entrada en fase
    /// transitoria incluida).
    #[error("operation '{operation}' is not valid in phase {phase}")]
    InvalidPhase { operation: &'static str, phase: String },
    #[error(transparent)]
    Preview(#[from] PreviewError),
    #[error(transparent)]
    PaymentInit(#[from] PaymentInitError),
    #[error(transparent)]
    Report(#[from] ReportError),
    /// El snapshot no pudo escribirse antes del redirect.
    #[error("session snapshot could not be written: {0}")]
    SnapshotWrite(SnapshotError),
    /// Retorno exitoso del pago pero el snapshot está ausente o inválido:
    /// pérdida de estado del cliente, distinta de un rechazo del servidor.
    #[error("session data lost across the payment redirect: {0}")]
    ReturnDataLoss(SnapshotError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Sub-flujo de propina sin identificador de reporte que asociar.
    #[error("no report identifier to associate the payment with")]
    MissingReportId,
    /// Motor armado sin alguno de sus colaboradores.
    #[error("engine builder missing component: {0}")]
    Incomplete(&'static str),
}
