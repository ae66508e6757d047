//! Seams asíncronos hacia los tres servicios externos y sus variantes de
//! respuesta cerradas.
//!
//! Los coordinadores concretos (HTTP) viven en `stat-adapters`; el motor sólo
//! conoce estos contratos. Cada llamada resuelve o falla una única vez: el
//! reintento es siempre una acción nueva del usuario, nunca un loop interno.
use async_trait::async_trait;
use url::Url;

use stat_domain::{ColumnClassification, ColumnPreview, MissingDataInfo, UploadedFile};

use crate::errors::{PaymentInitError, PreviewError, ReportError};
use crate::returns::CorrelationToken;

/// Tripla que produce un preview exitoso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOutcome {
    /// Orden de columnas (significativo: define presentación y mapeo).
    pub columns: Vec<String>,
    pub preview: ColumnPreview,
    pub missing: MissingDataInfo,
}

/// Destino de redirect externo emitido por el servicio de pagos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    /// Identificador de sesión del proveedor, si la respuesta lo trae.
    pub session_id: Option<String>,
    pub url: Url,
}

/// Documento renderizable devuelto por el servicio de reportes. Opaco: sólo
/// se interpreta el sobre de transporte, nunca el contenido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportArtifact {
    /// Cuerpo directo (la respuesta ES el documento).
    Document(String),
    /// Sobre estructurado con identificador para la propina posterior.
    Envelope { report_html: String, report_id: String },
}

impl ReportArtifact {
    pub fn html(&self) -> &str {
        match self {
            ReportArtifact::Document(body) => body,
            ReportArtifact::Envelope { report_html, .. } => report_html,
        }
    }

    pub fn report_id(&self) -> Option<&str> {
        match self {
            ReportArtifact::Document(_) => None,
            ReportArtifact::Envelope { report_id, .. } => Some(report_id),
        }
    }
}

/// Las dos formas aceptadas de pedir un reporte: generación directa sin pago
/// (variante gratuita), o generación pagada con token de correlación.
#[derive(Debug, Clone, Copy)]
pub enum ReportRequest<'a> {
    Direct { file: &'a UploadedFile, classification: &'a ColumnClassification },
    Paid {
        token: &'a CorrelationToken,
        file: &'a UploadedFile,
        classification: &'a ColumnClassification,
    },
}

impl ReportRequest<'_> {
    pub fn is_paid(&self) -> bool {
        matches!(self, ReportRequest::Paid { .. })
    }
}

/// Sube el archivo crudo y devuelve columnas + muestra + diagnóstico de
/// faltantes. Una invocación = una subida.
#[async_trait]
pub trait PreviewService: Send + Sync {
    async fn parse_preview(&self, file: &UploadedFile) -> Result<PreviewOutcome, PreviewError>;
}

/// Crea sesiones de pago externas: checkout pagado (archivo + clasificación)
/// y propina voluntaria (keyed por el id de reporte, no por el token).
#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_checkout(&self,
                             file: &UploadedFile,
                             classification: &ColumnClassification)
                             -> Result<RedirectTarget, PaymentInitError>;

    async fn create_tip_checkout(&self, report_id: &str, amount_minor: u32) -> Result<RedirectTarget, PaymentInitError>;
}

/// Canjea una solicitud (directa o pagada) por el artefacto de reporte.
#[async_trait]
pub trait ReportService: Send + Sync {
    async fn generate(&self, request: ReportRequest<'_>) -> Result<ReportArtifact, ReportError>;
}

// Delegación por Arc: permite compartir un servicio entre el motor y quien lo
// observa (tests que cuentan invocaciones, demos).
#[async_trait]
impl<T> PreviewService for std::sync::Arc<T> where T: PreviewService + ?Sized {
    async fn parse_preview(&self, file: &UploadedFile) -> Result<PreviewOutcome, PreviewError> {
        (**self).parse_preview(file).await
    }
}

#[async_trait]
impl<T> PaymentService for std::sync::Arc<T> where T: PaymentService + ?Sized {
    async fn create_checkout(&self,
                             file: &UploadedFile,
                             classification: &ColumnClassification)
                             -> Result<RedirectTarget, PaymentInitError> {
        (**self).create_checkout(file, classification).await
    }

    async fn create_tip_checkout(&self, report_id: &str, amount_minor: u32) -> Result<RedirectTarget, PaymentInitError> {
        (**self).create_tip_checkout(report_id, amount_minor).await
    }
}

#[async_trait]
impl<T> ReportService for std::sync::Arc<T> where T: ReportService + ?Sized {
    async fn generate(&self, request: ReportRequest<'_>) -> Result<ReportArtifact, ReportError> {
        (**self).generate(request).await
    }
}
