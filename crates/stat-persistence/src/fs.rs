//! `FileSessionStore`: sesión durable como documento JSON único en disco.
//!
//! Semántica:
//! - `put`/`remove` mutan un mapa staged en memoria; nada toca el disco hasta
//!   `commit`.
//! - `commit` escribe a archivo temporal + fsync + rename atómico + fsync del
//!   directorio. Cuando `commit` retorna Ok, una carga posterior del mismo
//!   directorio ve exactamente lo confirmado: la garantía que el motor
//!   necesita antes de entregar la navegación al proveedor externo.
//! - `open` relee el documento existente; un documento ilegible es un error
//!   semántico (`Corrupt`), nunca un mapa vacío silencioso.
use log::{debug, warn};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use stat_core::{SessionStore, StoreError};

use crate::config::StoreConfig;
use crate::error::PersistenceError;

const DOCUMENT: &str = "session.json";
const DOCUMENT_TMP: &str = "session.json.tmp";

#[derive(Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
    entries: HashMap<String, String>,
    dirty: bool,
}

impl FileSessionStore {
    /// Abre (o inicializa) el store sobre `dir`, releyendo el documento si
    /// existe.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let document = dir.join(DOCUMENT);
        let entries = match fs::read_to_string(&document) {
            Ok(raw) => serde_json::from_str::<HashMap<String, String>>(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("session store abierto en {:?} ({} entradas)", dir, entries.len());
        Ok(FileSessionStore { dir,
                              entries,
                              dirty: false })
    }

    /// Abre el store en el directorio configurado por entorno.
    pub fn open_from_env() -> Result<Self, PersistenceError> {
        Self::open(StoreConfig::from_env().dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cantidad de entradas staged (confirmadas o no).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn write_document(&self) -> Result<(), PersistenceError> {
        let tmp = self.dir.join(DOCUMENT_TMP);
        let target = self.dir.join(DOCUMENT);
        let payload = serde_json::to_vec_pretty(&self.entries)?;

        let mut file = OpenOptions::new().write(true).create(true).truncate(true).open(&tmp)?;
        file.write_all(&payload)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &target)?;
        // fsync del directorio: el rename tiene que ser durable, no sólo los
        // bytes del archivo.
        match File::open(&self.dir).and_then(|d| d.sync_all()) {
            Ok(()) => {}
            Err(e) => warn!("fsync del directorio {:?} falló: {e}", self.dir),
        }
        debug!("session document confirmado ({} entradas)", self.entries.len());
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.dirty = true;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        self.write_document().map_err(StoreError::from)?;
        self.dirty = false;
        Ok(())
    }
}
