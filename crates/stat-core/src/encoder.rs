//! Seam de empaquetado dominio → snapshot neutral.
//!
//! Regla clave: el snapshot debe ser autocontenido (el retorno del redirect
//! no puede recibir un handle vivo del archivo), así que el encoder produce
//! strings planos ya codificados. La implementación concreta (data URL +
//! base64) vive en `stat-adapters`; el motor sólo conoce este contrato.
use stat_domain::{ColumnClassification, UploadedFile};

use crate::errors::SnapshotError;
use crate::session::PersistedSession;

/// Contrato de empaquetado (archivo, clasificación) ⇄ snapshot persistible.
pub trait SessionEncoder: Send + Sync {
    /// Empaqueta el estado vivo en un snapshot autocontenido.
    fn encode(&self,
              file: &UploadedFile,
              classification: &ColumnClassification,
              report_id: Option<&str>)
              -> Result<PersistedSession, SnapshotError>;

    /// Reconstituye el estado vivo desde un snapshot ya validado. Cualquier
    /// forma indecodificable es `SnapshotError` (pérdida de datos), nunca un
    /// valor por defecto.
    fn decode(&self, snapshot: &PersistedSession) -> Result<(UploadedFile, ColumnClassification), SnapshotError>;
}
