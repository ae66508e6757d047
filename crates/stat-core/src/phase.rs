//! Fase del workflow: etiqueta cerrada, exactamente una vigente a la vez.
use serde::{Deserialize, Serialize};

/// Fase actual de la máquina de estados (inicial: `Idle`).
///
/// Las fases transitorias (`PreviewLoading`, `PaymentInitiating`,
/// `ReportGenerating`) cubren una suspensión de red: mientras duran, la
/// superficie de llamada deshabilita el control disparador y el motor rechaza
/// re-entradas. Las terminales son descartables por el usuario pero nunca
/// auto-avanzan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    PreviewLoading,
    PreviewReady,
    PaymentInitiating,
    /// La navegación fue entregada al proveedor externo; esta carga de página
    /// terminó. Sólo se re-entra reconstruyendo desde el snapshot.
    AwaitingExternalReturn,
    ReportGenerating,
    ReportReady,
    PaymentCancelled,
    Failed { reason: String },
}

impl WorkflowPhase {
    /// Fase con una operación de red en vuelo.
    pub fn is_transient(&self) -> bool {
        matches!(self,
                 WorkflowPhase::PreviewLoading | WorkflowPhase::PaymentInitiating | WorkflowPhase::ReportGenerating)
    }

    /// Fase final de una corrida (descartable, no auto-avanza).
    pub fn is_terminal(&self) -> bool {
        matches!(self,
                 WorkflowPhase::ReportReady | WorkflowPhase::PaymentCancelled | WorkflowPhase::Failed { .. })
    }

    /// Nombre estable para mensajes y journal.
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowPhase::Idle => "Idle",
            WorkflowPhase::PreviewLoading => "PreviewLoading",
            WorkflowPhase::PreviewReady => "PreviewReady",
            WorkflowPhase::PaymentInitiating => "PaymentInitiating",
            WorkflowPhase::AwaitingExternalReturn => "AwaitingExternalReturn",
            WorkflowPhase::ReportGenerating => "ReportGenerating",
            WorkflowPhase::ReportReady => "ReportReady",
            WorkflowPhase::PaymentCancelled => "PaymentCancelled",
            WorkflowPhase::Failed { .. } => "Failed",
        }
    }
}

impl Default for WorkflowPhase {
    fn default() -> Self {
        WorkflowPhase::Idle
    }
}
