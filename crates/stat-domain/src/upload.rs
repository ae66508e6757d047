//! Archivo tabular seleccionado por el usuario.
//!
//! `UploadedFile` es el payload opaco que viaja por todo el workflow: se sube
//! al servicio de preview, se serializa antes del redirect externo y se
//! reconstituye al volver. El contenido nunca se interpreta aquí (el parseo
//! del formato vive en el servicio externo).
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::DomainError;

/// Media type por defecto cuando la extensión no aparece en la tabla.
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

// Tabla estática extensión → media type para los formatos tabulares que el
// flujo acepta. Evaluada una sola vez.
static MEDIA_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("csv", "text/csv");
    m.insert("tsv", "text/tab-separated-values");
    m.insert("txt", "text/plain");
    m
});

/// Archivo subido: nombre declarado + media type declarado + bytes opacos.
/// Inmutable durante toda una corrida del workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Crea un archivo con media type explícito.
    ///
    /// # Errores
    /// `DomainError::Validation` si el nombre o el contenido están vacíos.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::Validation("el archivo necesita un nombre".to_string()));
        }
        if bytes.is_empty() {
            return Err(DomainError::Validation(format!("el archivo '{name}' está vacío")));
        }
        Ok(UploadedFile { name,
                          media_type: media_type.into(),
                          bytes })
    }

    /// Crea un archivo infiriendo el media type desde la extensión del nombre.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DomainError> {
        let name = name.into();
        let media_type = guess_media_type(&name);
        Self::new(name, media_type, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Digest SHA-256 (hex) del contenido. Identidad estable del payload:
    /// se usa para trazabilidad en el journal y para verificar que la
    /// reconstitución post-redirect devuelve bytes idénticos.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        format!("{:x}", hasher.finalize())
    }
}

fn guess_media_type(name: &str) -> &'static str {
    name.rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| MEDIA_TYPES.get(ext.as_str()).copied())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_media_type_from_extension() {
        let f = UploadedFile::from_bytes("dane.CSV", b"a,b\n1,2\n".to_vec()).unwrap();
        assert_eq!(f.media_type(), "text/csv");
        let f = UploadedFile::from_bytes("notas.bin", vec![1, 2, 3]).unwrap();
        assert_eq!(f.media_type(), FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn rejects_empty_payload_and_name() {
        assert!(UploadedFile::from_bytes("dane.csv", vec![]).is_err());
        assert!(UploadedFile::from_bytes("   ", b"x".to_vec()).is_err());
    }

    #[test]
    fn content_hash_is_stable_per_bytes() {
        let a = UploadedFile::from_bytes("a.csv", b"id,age\n1,20\n".to_vec()).unwrap();
        let b = UploadedFile::from_bytes("b.csv", b"id,age\n1,20\n".to_vec()).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        let c = UploadedFile::from_bytes("c.csv", b"id,age\n1,21\n".to_vec()).unwrap();
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
