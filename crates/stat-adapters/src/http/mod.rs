//! Clientes HTTP de los tres servicios externos.
//!
//! Cada cliente atrapa sus errores de red en su propia frontera y los
//! normaliza a mensaje legible: transporte caído → `Network`, respuesta
//! no-2xx → `ServerRejected` con el mensaje estructurado del cuerpo si se
//! puede leer, 2xx indecodificable → `MalformedResponse`. Sin reintentos:
//! cada intento resuelve o falla una vez.
mod payment;
mod preview;
mod report;

pub use payment::HttpPaymentService;
pub use preview::HttpPreviewService;
pub use report::{HttpReportService, ResumeStyle};

use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

/// Cuerpos de error estructurados que emiten los servicios: el preview usa
/// `{"error": ...}`, pago y reporte usan `{"detail": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
}

const MAX_RAW_MESSAGE: usize = 300;

/// Normaliza una respuesta de rechazo a un mensaje legible: campo
/// estructurado si lo hay, texto plano acotado como fallback, status como
/// último recurso.
pub(crate) fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.detail.or(parsed.error) {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {status}");
    }
    let mut message: String = trimmed.chars().take(MAX_RAW_MESSAGE).collect();
    if message.len() < trimmed.len() {
        message.push('…');
    }
    message
}

/// Direcciones de los cuatro endpoints, derivadas de la base del API.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub parse_preview: Url,
    pub create_payment_session: Url,
    pub create_voluntary_payment_session: Url,
    pub generate_report: Url,
}

impl ApiEndpoints {
    /// Deriva los endpoints desde la base (p.ej. `https://host/api`).
    pub fn new(base: Url) -> Result<Self, url::ParseError> {
        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(ApiEndpoints { parse_preview: base.join("parse-preview")?,
                          create_payment_session: base.join("create-payment-session")?,
                          create_voluntary_payment_session: base.join("create-voluntary-payment-session")?,
                          generate_report: base.join("generate-report")? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_derive_from_base_with_or_without_slash() {
        let a = ApiEndpoints::new(Url::parse("https://host/api").unwrap()).unwrap();
        let b = ApiEndpoints::new(Url::parse("https://host/api/").unwrap()).unwrap();
        assert_eq!(a.parse_preview.as_str(), "https://host/api/parse-preview");
        assert_eq!(a.generate_report.as_str(), b.generate_report.as_str());
    }

    #[test]
    fn rejection_message_prefers_structured_fields() {
        let s = StatusCode::BAD_REQUEST;
        assert_eq!(rejection_message(s, r#"{"error": "zly plik"}"#), "zly plik");
        assert_eq!(rejection_message(s, r#"{"detail": "brak sesji"}"#), "brak sesji");
        assert_eq!(rejection_message(s, "plain text"), "plain text");
        assert_eq!(rejection_message(s, "  "), "HTTP 400 Bad Request");
    }
}
