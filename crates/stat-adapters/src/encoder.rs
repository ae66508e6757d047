//! Implementación del `SessionEncoder` del core sobre el codec de data URL.
use indexmap::IndexMap;

use stat_core::{PersistedSession, SessionEncoder, SnapshotError};
use stat_domain::{ColumnClassification, MissingDataStrategy, UploadedFile, VariableType};

use crate::codec;

/// Encoder por defecto: archivo como data URL, asignación como JSON en orden
/// de columnas, estrategia como token de wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlSessionEncoder;

impl SessionEncoder for DataUrlSessionEncoder {
    fn encode(&self,
              file: &UploadedFile,
              classification: &ColumnClassification,
              report_id: Option<&str>)
              -> Result<PersistedSession, SnapshotError> {
        // El gate corre antes de cualquier persistencia; una estrategia sin
        // resolver acá es un snapshot que no podría reanudarse.
        let strategy = classification.strategy()
                                     .map(|s| s.as_wire().to_string())
                                     .ok_or_else(|| SnapshotError::Corrupt("missing-data strategy not resolved".to_string()))?;
        Ok(PersistedSession::new(file.name().to_string(),
                                 codec::encode_data_url(file.media_type(), file.bytes()),
                                 classification.types_json(),
                                 strategy,
                                 report_id.map(str::to_string)))
    }

    fn decode(&self, snapshot: &PersistedSession) -> Result<(UploadedFile, ColumnClassification), SnapshotError> {
        let (media_type, bytes) =
            codec::decode_data_url(&snapshot.file_data_url).map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
        let file = UploadedFile::new(snapshot.file_name.clone(), media_type, bytes)
            .map_err(|e| SnapshotError::Corrupt(e.to_string()))?;

        let types: IndexMap<String, VariableType> = serde_json::from_str(&snapshot.variable_types_json)
            .map_err(|e| SnapshotError::Corrupt(format!("variable_types: {e}")))?;
        let strategy = MissingDataStrategy::from_wire(&snapshot.strategy)
            .ok_or_else(|| SnapshotError::Corrupt(format!("unknown strategy token '{}'", snapshot.strategy)))?;

        Ok((file, ColumnClassification::from_parts(types, Some(strategy))))
    }
}
