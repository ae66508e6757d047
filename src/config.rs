//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
//! También provee `create_http_client` y `create_endpoints` para armar los
//! clientes de los servicios externos a partir de la base configurada.
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

// URL de producción del API como fallback, igual que el frontend original.
const DEFAULT_API_URL: &str = "https://analiza-danych.onrender.com/api";
const DEFAULT_SESSION_DIR: &str = ".statflow-session";

/// Configuración global de la aplicación (extensible para más secciones).
pub struct AppConfig {
    /// Configuración del API de servicios externos.
    pub api: ApiConfig,
    /// Configuración del store de sesión durable.
    pub session: SessionConfig,
}

/// Parámetros del API externo.
pub struct ApiConfig {
    /// Base completa (p.ej. `https://host/api`).
    pub base_url: String,
    /// Timeout por request, en segundos.
    pub timeout_secs: u64,
}

/// Parámetros del store de sesión.
pub struct SessionConfig {
    pub dir: PathBuf,
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
    let base_url = env::var("STATFLOW_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let timeout_secs = env::var("STATFLOW_HTTP_TIMEOUT_SECS").ok()
        .and_then(|v| v.parse().ok()).unwrap_or(120);
    let dir = env::var("STATFLOW_SESSION_DIR").unwrap_or_else(|_| DEFAULT_SESSION_DIR.to_string());
    AppConfig {
        api: ApiConfig { base_url, timeout_secs },
        session: SessionConfig { dir: PathBuf::from(dir) },
    }
});

/// Crea el cliente HTTP compartido según la configuración cargada.
pub fn create_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(CONFIG.api.timeout_secs))
        .build()
}

/// Deriva los endpoints de los servicios desde la base configurada.
pub fn create_endpoints() -> Result<stat_adapters::ApiEndpoints, url::ParseError> {
    let base = url::Url::parse(&CONFIG.api.base_url)?;
    stat_adapters::ApiEndpoints::new(base)
}
