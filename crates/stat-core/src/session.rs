//! Snapshot de sesión y su medio de almacenamiento durable.
//!
//! El redirect externo descarta sin excepción la memoria de la página; todo
//! lo que la reanudación necesita se escribe antes bajo claves fijas de un
//! `SessionStore`. El snapshot lleva versión de esquema y fingerprint
//! canónico: al restaurar se valida la forma completa y cualquier desajuste
//! se trata como pérdida de datos, nunca como éxito silencioso.
//!
//! Ciclo de vida: creado justo antes del redirect, consumido exactamente una
//! vez al volver, intacto para reintento manual si la reanudación falla.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use crate::constants::{keys, SNAPSHOT_SCHEMA_VERSION};
use crate::errors::{SnapshotError, StoreError};
use crate::hashing::hash_value;

/// Persistencia clave/valor que sobrevive a la recarga de la página.
///
/// Contrato:
/// - `commit` es la barrera de durabilidad: al volver, todo `put`/`remove`
///   previo debe ser visible. El motor siempre confirma antes de entregar la
///   navegación.
/// - Un único consumidor lógico (la carga que retorna) lee y limpia; escrituras
///   son last-writer-wins (no existe escenario de escritores concurrentes).
pub trait SessionStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    /// Confirma durablemente lo escrito hasta aquí.
    fn commit(&mut self) -> Result<(), StoreError>;
}

/// Backend en memoria: misma semántica observable que el durable, sin disco.
pub struct InMemorySessionStore {
    pub inner: HashMap<String, String>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        InMemorySessionStore { inner: HashMap::new() }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Snapshot versionado del estado que cruza el redirect: archivo codificado
/// en forma autocontenida, asignación de tipos en JSON, estrategia, y (en la
/// variante de generación directa) el identificador de reporte emitido por el
/// servidor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedSession {
    pub schema_version: u32,
    pub file_name: String,
    /// Archivo completo como data URL (`data:<media>;base64,<payload>`).
    pub file_data_url: String,
    /// Asignación columna → token de tipo, JSON, en orden de columnas.
    pub variable_types_json: String,
    /// Token de wire de la estrategia elegida.
    pub strategy: String,
    pub report_id: Option<String>,
    /// Metadato: no participa del fingerprint.
    pub saved_at: DateTime<Utc>,
}

impl PersistedSession {
    pub fn new(file_name: String,
               file_data_url: String,
               variable_types_json: String,
               strategy: String,
               report_id: Option<String>)
               -> Self {
        PersistedSession { schema_version: SNAPSHOT_SCHEMA_VERSION,
                           file_name,
                           file_data_url,
                           variable_types_json,
                           strategy,
                           report_id,
                           saved_at: Utc::now() }
    }

    /// Fingerprint canónico del contenido (sin `saved_at`).
    pub fn fingerprint(&self) -> String {
        hash_value(&json!({
            "schema_version": self.schema_version,
            "file_name": self.file_name,
            "file_data_url": self.file_data_url,
            "variable_types_json": self.variable_types_json,
            "strategy": self.strategy,
            "report_id": self.report_id,
        }))
    }

    /// Escribe el snapshot bajo sus claves fijas y confirma durablemente.
    pub fn persist<S: SessionStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put(keys::SCHEMA_VERSION, &self.schema_version.to_string())?;
        store.put(keys::FILE_NAME, &self.file_name)?;
        store.put(keys::FILE_DATA_URL, &self.file_data_url)?;
        store.put(keys::VARIABLE_TYPES, &self.variable_types_json)?;
        store.put(keys::MISSING_DATA_STRATEGY, &self.strategy)?;
        match &self.report_id {
            Some(id) => store.put(keys::REPORT_ID, id)?,
            None => store.remove(keys::REPORT_ID)?,
        }
        store.put(keys::SAVED_AT, &self.saved_at.to_rfc3339())?;
        store.put(keys::FINGERPRINT, &self.fingerprint())?;
        store.commit()
    }

    /// Relee el snapshot validando forma completa: entradas presentes,
    /// versión de esquema soportada y fingerprint intacto.
    pub fn restore<S: SessionStore + ?Sized>(store: &S) -> Result<Self, SnapshotError> {
        let version_raw = required(store, keys::SCHEMA_VERSION)?;
        let schema_version: u32 = version_raw.parse()
                                             .map_err(|_| SnapshotError::Version { found: version_raw.clone(),
                                                                                   expected: SNAPSHOT_SCHEMA_VERSION })?;
        if schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::Version { found: version_raw,
                                                expected: SNAPSHOT_SCHEMA_VERSION });
        }

        let file_name = required(store, keys::FILE_NAME)?;
        let file_data_url = required(store, keys::FILE_DATA_URL)?;
        let variable_types_json = required(store, keys::VARIABLE_TYPES)?;
        let strategy = required(store, keys::MISSING_DATA_STRATEGY)?;
        let report_id = store.get(keys::REPORT_ID)?;
        let saved_at_raw = required(store, keys::SAVED_AT)?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| SnapshotError::Corrupt(format!("saved_at: {e}")))?;

        let snapshot = PersistedSession { schema_version,
                                          file_name,
                                          file_data_url,
                                          variable_types_json,
                                          strategy,
                                          report_id,
                                          saved_at };

        let recorded = required(store, keys::FINGERPRINT)?;
        if recorded != snapshot.fingerprint() {
            return Err(SnapshotError::Integrity);
        }
        Ok(snapshot)
    }

    /// Borra todas las claves conocidas y confirma. Se usa al consumir el
    /// snapshot y en el reset explícito (selección de archivo nuevo).
    pub fn clear<S: SessionStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
        for key in keys::ALL {
            store.remove(key)?;
        }
        store.commit()
    }
}

fn required<S: SessionStore + ?Sized>(store: &S, key: &str) -> Result<String, SnapshotError> {
    store.get(key)?
         .ok_or_else(|| SnapshotError::MissingEntry(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersistedSession {
        PersistedSession::new("dane.csv".into(),
                              "data:text/csv;base64,aWQsYWdlCjEsMjAK".into(),
                              r#"{"id":"pomiń","age":"ciągła"}"#.into(),
                              "impute".into(),
                              None)
    }

    #[test]
    fn persist_then_restore_is_identity_modulo_nothing() {
        let mut store = InMemorySessionStore::new();
        let original = sample();
        original.persist(&mut store).unwrap();
        let restored = PersistedSession::restore(&store).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.fingerprint(), original.fingerprint());
    }

    #[test]
    fn restore_without_snapshot_names_the_missing_entry() {
        let store = InMemorySessionStore::new();
        let err = PersistedSession::restore(&store).unwrap_err();
        assert_eq!(err, SnapshotError::MissingEntry(keys::SCHEMA_VERSION.to_string()));
    }

    #[test]
    fn tampered_entry_breaks_the_fingerprint() {
        let mut store = InMemorySessionStore::new();
        sample().persist(&mut store).unwrap();
        store.put(keys::MISSING_DATA_STRATEGY, "delete_rows").unwrap();
        assert_eq!(PersistedSession::restore(&store).unwrap_err(), SnapshotError::Integrity);
    }

    #[test]
    fn foreign_schema_version_is_rejected() {
        let mut store = InMemorySessionStore::new();
        sample().persist(&mut store).unwrap();
        store.put(keys::SCHEMA_VERSION, "99").unwrap();
        match PersistedSession::restore(&store).unwrap_err() {
            SnapshotError::Version { found, expected } => {
                assert_eq!(found, "99");
                assert_eq!(expected, SNAPSHOT_SCHEMA_VERSION);
            }
            other => panic!("expected Version, got {other:?}"),
        }
    }

    #[test]
    fn clear_removes_every_fixed_key() {
        let mut store = InMemorySessionStore::new();
        sample().persist(&mut store).unwrap();
        PersistedSession::clear(&mut store).unwrap();
        assert!(store.inner.is_empty());
        assert!(matches!(PersistedSession::restore(&store), Err(SnapshotError::MissingEntry(_))));
    }
}
