//! Carga de configuración del store desde variables de entorno.
//! Usa la convención `STATFLOW_SESSION_DIR` con default local.

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directorio donde vive el documento de sesión.
    pub dir: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let dir = env::var("STATFLOW_SESSION_DIR").unwrap_or_else(|_| ".statflow-session".to_string());
        Self { dir: PathBuf::from(dir) }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
