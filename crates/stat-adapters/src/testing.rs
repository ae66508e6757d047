//! Servicios guionados en memoria para tests y demos.
//!
//! Cada servicio entrega respuestas pre-cargadas en orden FIFO y cuenta sus
//! invocaciones, lo que permite afirmar propiedades como "exactamente un
//! intento de generación por retorno exitoso" sin tocar la red.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use stat_core::{PaymentInitError, PaymentService, PreviewError, PreviewOutcome, PreviewService, RedirectTarget,
                ReportArtifact, ReportError, ReportRequest, ReportService};
use stat_domain::{ColumnPreview, MissingDataInfo, UploadedFile};

fn exhausted(which: &str) -> String {
    format!("scripted {which} service exhausted")
}

/// Preview guionado: responde lo pre-cargado, en orden.
#[derive(Default)]
pub struct ScriptedPreviewService {
    responses: Mutex<VecDeque<Result<PreviewOutcome, PreviewError>>>,
    calls: AtomicUsize,
}

impl ScriptedPreviewService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responding(outcome: Result<PreviewOutcome, PreviewError>) -> Self {
        let s = Self::new();
        s.push(outcome);
        s
    }

    pub fn push(&self, outcome: Result<PreviewOutcome, PreviewError>) {
        if let Ok(mut q) = self.responses.lock() {
            q.push_back(outcome);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreviewService for ScriptedPreviewService {
    async fn parse_preview(&self, _file: &UploadedFile) -> Result<PreviewOutcome, PreviewError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Err(PreviewError::Network(exhausted("preview"))))
    }
}

/// Pagos guionados: cola separada para checkout y propina.
#[derive(Default)]
pub struct ScriptedPaymentService {
    checkouts: Mutex<VecDeque<Result<RedirectTarget, PaymentInitError>>>,
    tips: Mutex<VecDeque<Result<RedirectTarget, PaymentInitError>>>,
    checkout_calls: AtomicUsize,
    tip_calls: AtomicUsize,
}

impl ScriptedPaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_checkout(&self, outcome: Result<RedirectTarget, PaymentInitError>) {
        if let Ok(mut q) = self.checkouts.lock() {
            q.push_back(outcome);
        }
    }

    pub fn push_tip(&self, outcome: Result<RedirectTarget, PaymentInitError>) {
        if let Ok(mut q) = self.tips.lock() {
            q.push_back(outcome);
        }
    }

    pub fn checkout_calls(&self) -> usize {
        self.checkout_calls.load(Ordering::SeqCst)
    }

    pub fn tip_calls(&self) -> usize {
        self.tip_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentService for ScriptedPaymentService {
    async fn create_checkout(&self,
                             _file: &UploadedFile,
                             _classification: &stat_domain::ColumnClassification)
                             -> Result<RedirectTarget, PaymentInitError> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        self.checkouts
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Err(PaymentInitError::Network(exhausted("payment"))))
    }

    async fn create_tip_checkout(&self, _report_id: &str, _amount_minor: u32) -> Result<RedirectTarget, PaymentInitError> {
        self.tip_calls.fetch_add(1, Ordering::SeqCst);
        self.tips
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Err(PaymentInitError::Network(exhausted("payment"))))
    }
}

/// Reportes guionados; registra además si la última solicitud fue pagada.
#[derive(Default)]
pub struct ScriptedReportService {
    responses: Mutex<VecDeque<Result<ReportArtifact, ReportError>>>,
    calls: AtomicUsize,
    last_paid: Mutex<Option<bool>>,
}

impl ScriptedReportService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responding(outcome: Result<ReportArtifact, ReportError>) -> Self {
        let s = Self::new();
        s.push(outcome);
        s
    }

    pub fn push(&self, outcome: Result<ReportArtifact, ReportError>) {
        if let Ok(mut q) = self.responses.lock() {
            q.push_back(outcome);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request_was_paid(&self) -> Option<bool> {
        self.last_paid.lock().ok().and_then(|g| *g)
    }
}

#[async_trait]
impl ReportService for ScriptedReportService {
    async fn generate(&self, request: ReportRequest<'_>) -> Result<ReportArtifact, ReportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut g) = self.last_paid.lock() {
            *g = Some(request.is_paid());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Err(ReportError::Network(exhausted("report"))))
    }
}

// --- Constructores de datos de prueba compartidos -------------------------

/// Archivo CSV chico y estable para tests/demos.
pub fn sample_file() -> UploadedFile {
    UploadedFile::from_bytes("dane.csv", b"id,age,city\n1,20,Radom\n2,31,Opole\n".to_vec())
        .unwrap_or_else(|e| panic!("sample file: {e}"))
}

/// Preview exitoso para `columns`, marcando faltantes en `missing_columns`.
pub fn preview_outcome(columns: &[&str], missing_columns: &[&str]) -> PreviewOutcome {
    let missing = MissingDataInfo { has_missing_data: !missing_columns.is_empty(),
                                    columns_with_missing_data:
                                        missing_columns.iter().map(|c| c.to_string()).collect(),
                                    detection_method: None,
                                    missing_value_locations: Vec::new() };
    let preview = ColumnPreview { columns: columns.iter().map(|c| c.to_string()).collect(),
                                  rows: Vec::new() };
    PreviewOutcome { columns: columns.iter().map(|c| c.to_string()).collect(),
                     preview,
                     missing }
}

/// Destino de redirect apuntando al checkout simulado.
pub fn redirect_to(url: &str) -> RedirectTarget {
    RedirectTarget { session_id: Some("cs_test".to_string()),
                     url: Url::parse(url).unwrap_or_else(|e| panic!("redirect url: {e}")) }
}
