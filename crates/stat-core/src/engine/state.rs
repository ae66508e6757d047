//! Estado explícito del workflow.
//!
//! Todo lo que antes sería estado ambiente disperso en callbacks vive acá,
//! en un objeto que el motor posee y muta en cada transición. La capa de
//! presentación lo observa y despacha operaciones; no guarda nada propio.
use serde::{Deserialize, Serialize};

use stat_domain::{ColumnClassification, ColumnPreview, MissingDataInfo, UploadedFile};

use crate::gate::{self, GateViolation};
use crate::phase::WorkflowPhase;
use crate::services::ReportArtifact;

/// Resultado visible del sub-flujo de propina voluntaria.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TipStatus {
    None,
    Succeeded,
    Cancelled,
}

/// Estado completo de una corrida del workflow.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub phase: WorkflowPhase,
    pub file: Option<UploadedFile>,
    pub preview: Option<ColumnPreview>,
    pub missing: Option<MissingDataInfo>,
    pub classification: Option<ColumnClassification>,
    pub report: Option<ReportArtifact>,
    /// Identificador emitido por el servidor junto con el reporte (clave del
    /// sub-flujo de propina).
    pub report_id: Option<String>,
    /// Último error normalizado a mensaje legible, para la presentación.
    pub last_error: Option<String>,
    /// Anotación del gate sobre la fase actual. Nunca implica cambio de fase.
    pub gate_notice: Option<GateViolation>,
    pub tip_status: TipStatus,
}

impl WorkflowState {
    pub fn new() -> Self {
        WorkflowState { phase: WorkflowPhase::Idle,
                        file: None,
                        preview: None,
                        missing: None,
                        classification: None,
                        report: None,
                        report_id: None,
                        last_error: None,
                        gate_notice: None,
                        tip_status: TipStatus::None }
    }

    /// Reset completo a `Idle` (descartar corrida anterior).
    pub fn reset(&mut self) {
        *self = WorkflowState::new();
    }

    /// ¿Pasaría el gate de envío ahora mismo? Lectura pura, sin efectos;
    /// pensada para que la presentación habilite/deshabilite el control.
    pub fn submit_ready(&self) -> bool {
        gate::evaluate(self.file.as_ref(), self.missing.as_ref(), self.classification.as_ref()).is_ok()
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}
