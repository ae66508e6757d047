//! Constantes del núcleo del workflow.
//!
//! Agrupa los valores fijos compartidos entre la máquina de estados, el
//! snapshot de sesión y la detección de retorno. Las claves del store y los
//! marcadores de retorno son contrato: cambiarlos rompe la reanudación de
//! sesiones ya persistidas.

/// Versión del esquema del snapshot persistido. Participa del fingerprint:
/// un snapshot escrito con otra versión nunca se acepta en silencio.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Claves fijas bajo las que el snapshot vive en el `SessionStore`.
pub mod keys {
    pub const FILE_DATA_URL: &str = "file_data_url";
    pub const FILE_NAME: &str = "file_name";
    pub const VARIABLE_TYPES: &str = "variable_types";
    pub const MISSING_DATA_STRATEGY: &str = "missing_data_strategy";
    pub const REPORT_ID: &str = "report_id";
    pub const SCHEMA_VERSION: &str = "schema_version";
    pub const FINGERPRINT: &str = "fingerprint";
    pub const SAVED_AT: &str = "saved_at";

    /// Toda clave conocida; `clear` borra exactamente este conjunto.
    pub const ALL: &[&str] = &[FILE_DATA_URL,
                               FILE_NAME,
                               VARIABLE_TYPES,
                               MISSING_DATA_STRATEGY,
                               REPORT_ID,
                               SCHEMA_VERSION,
                               FINGERPRINT,
                               SAVED_AT];
}

/// Marcadores que el proveedor de pagos incrusta en la dirección de retorno.
pub mod markers {
    /// Path de retorno exitoso del checkout pagado.
    pub const SUCCESS_PATH: &str = "/sukces";
    /// Path de retorno cancelado del checkout pagado.
    pub const CANCEL_PATH: &str = "/anulowano";
    /// Query param con el token de correlación emitido por el proveedor.
    pub const SESSION_ID: &str = "session_id";
    /// Query params del sub-flujo de propina voluntaria.
    pub const PAYMENT_STATUS: &str = "payment_status";
    pub const REPORT_ID: &str = "report_id";
    pub const STATUS_SUCCESS: &str = "success";
    pub const STATUS_CANCELLED: &str = "cancelled";
}
