//! Cliente del servicio de reportes.
//!
//! Dos formas aceptadas de reanudación pagada conviven en el producto (ver
//! DESIGN.md): re-subir el archivo junto con el token, o mandar el token solo
//! y dejar que el servidor resuelva la sesión previamente pagada. La elección
//! es configuración del cliente, no lógica del motor.
use async_trait::async_trait;
use log::debug;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use stat_core::{ReportArtifact, ReportError, ReportRequest, ReportService};
use stat_domain::{ColumnClassification, UploadedFile};

use super::{rejection_message, ApiEndpoints};

/// Forma de wire de la reanudación pagada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeStyle {
    /// Re-subir archivo + asignación + estrategia + token.
    Reupload,
    /// Token solo; el servidor guarda el contexto de la sesión pagada.
    SessionOnly,
}

pub struct HttpReportService {
    client: Client,
    endpoint: Url,
    style: ResumeStyle,
}

impl HttpReportService {
    pub fn new(client: Client, endpoints: &ApiEndpoints, style: ResumeStyle) -> Self {
        HttpReportService { client,
                            endpoint: endpoints.generate_report.clone(),
                            style }
    }

    fn multipart_form(file: &UploadedFile,
                      classification: &ColumnClassification,
                      session_id: Option<&str>)
                      -> Result<multipart::Form, ReportError> {
        let part = multipart::Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string())
                                                                .mime_str(file.media_type())
                                                                .map_err(|e| ReportError::Network(e.to_string()))?;
        let strategy = classification.strategy().map(|s| s.as_wire()).unwrap_or_default();
        let mut form = multipart::Form::new().part("file", part)
                                             .text("variable_types_json", classification.types_json())
                                             .text("missing_data_strategy", strategy.to_string());
        if let Some(id) = session_id {
            form = form.text("session_id", id.to_string());
        }
        Ok(form)
    }
}

/// Sobre estructurado del reporte (variante con propina posterior).
#[derive(Debug, Deserialize)]
struct EnvelopeWire {
    report_html: String,
    report_id: String,
}

/// Decodifica el cuerpo 2xx: sobre JSON si parsea, documento directo si no.
/// El contenido nunca se interpreta, sólo el sobre de transporte.
pub(crate) fn decode_report_body(body: &str) -> Result<ReportArtifact, ReportError> {
    if body.trim().is_empty() {
        return Err(ReportError::MalformedResponse("empty report body".to_string()));
    }
    match serde_json::from_str::<EnvelopeWire>(body) {
        Ok(envelope) => Ok(ReportArtifact::Envelope { report_html: envelope.report_html,
                                                      report_id: envelope.report_id }),
        Err(_) => Ok(ReportArtifact::Document(body.to_string())),
    }
}

#[async_trait]
impl ReportService for HttpReportService {
    async fn generate(&self, request: ReportRequest<'_>) -> Result<ReportArtifact, ReportError> {
        let builder = match (request, self.style) {
            (ReportRequest::Direct { file, classification }, _) => {
                debug!("generación directa para '{}'", file.name());
                let form = Self::multipart_form(file, classification, None)?;
                self.client.post(self.endpoint.clone()).multipart(form)
            }
            (ReportRequest::Paid { token, file, classification }, ResumeStyle::Reupload) => {
                debug!("generación pagada (re-subida) para '{}'", file.name());
                let form = Self::multipart_form(file, classification, Some(&token.0))?;
                self.client.post(self.endpoint.clone()).multipart(form)
            }
            (ReportRequest::Paid { token, .. }, ResumeStyle::SessionOnly) => {
                debug!("generación pagada (sesión) con token {token}");
                self.client
                    .post(self.endpoint.clone())
                    .json(&json!({ "session_id": token.0 }))
            }
        };

        let response = builder.send().await.map_err(|e| ReportError::Network(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ReportError::Network(e.to_string()))?;
        if !status.is_success() {
            // Cuerpo estructurado con mensaje, o texto plano como fallback.
            return Err(ReportError::ServerRejected(rejection_message(status, &body)));
        }
        decode_report_body(&body)
    }
}
