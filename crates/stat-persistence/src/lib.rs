//! stat-persistence: backend durable del `SessionStore` del core.
//!
//! Objetivo:
//! - Proveer persistencia de sesión que sobreviva a la recarga completa de la
//!   página/proceso, con paridad observable 1:1 respecto al backend en
//!   memoria del core.
//! - Hacer de `commit` una barrera real de durabilidad (escritura atómica +
//!   fsync): la ordenación escribir-antes-de-navegar depende de esto.
//! - Aislar el mapeo de errores de IO a variantes semánticas del dominio de
//!   persistencia.
pub mod config;
pub mod error;
pub mod fs;

pub use config::StoreConfig;
pub use error::PersistenceError;
pub use fs::FileSessionStore;
