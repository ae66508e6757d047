//! Journal append-only de transiciones del workflow.
//!
//! Rol:
//! - Cada operación del motor emite eventos a un journal en memoria.
//! - El journal es observabilidad y auditoría de la corrida: la fase vigente
//!   vive en el estado explícito, no se reconstruye por replay (la
//!   reconstrucción post-redirect pasa por el snapshot, no por eventos).
//! - `ts` es metadato: no participa de ningún fingerprint.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stat_domain::{MissingDataStrategy, VariableType};

use crate::errors::{PaymentInitError, PreviewError, ReportError, SnapshotError};
use crate::gate::GateViolation;

/// Tipos de evento observables de una corrida.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WorkflowEventKind {
    /// Archivo elegido; resetea incondicionalmente la corrida anterior.
    FileSelected { name: String, content_hash: String },
    PreviewLoaded { column_count: usize, has_missing_data: bool },
    PreviewFailed { error: PreviewError },
    TypeAssigned { column: String, variable_type: VariableType },
    StrategyChosen { strategy: MissingDataStrategy },
    GateRejected { violation: GateViolation },
    /// Snapshot durablemente confirmado ANTES de pedir el redirect.
    SnapshotPersisted { fingerprint: String },
    /// La navegación fue entregada; último evento posible de esta carga.
    RedirectIssued { url: String },
    PaymentInitFailed { error: PaymentInitError },
    /// Marcadores de retorno detectados (y ya retirados de la dirección).
    ReturnDetected { outcome: String },
    SnapshotRestored { fingerprint: String },
    SnapshotLost { error: SnapshotError },
    ReportRequested { paid: bool },
    ReportCompleted { report_id: Option<String> },
    ReportFailed { error: ReportError },
    TipRequested { report_id: String, amount_minor: u32 },
    TipReturnDetected { report_id: String, accepted: bool },
    WorkflowReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub seq: u64, // orden de append dentro de la corrida
    pub run_id: Uuid,
    pub kind: WorkflowEventKind,
    pub ts: DateTime<Utc>, // metadato (fuera de todo fingerprint)
}

/// Journal en memoria de una corrida del workflow.
#[derive(Debug)]
pub struct Journal {
    run_id: Uuid,
    events: Vec<WorkflowEvent>,
}

impl Journal {
    pub fn new() -> Self {
        Journal { run_id: Uuid::new_v4(),
                  events: Vec::new() }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn append(&mut self, kind: WorkflowEventKind) -> WorkflowEvent {
        let ev = WorkflowEvent { seq: self.events.len() as u64,
                                 run_id: self.run_id,
                                 kind,
                                 ts: Utc::now() };
        self.events.push(ev.clone());
        ev
    }

    pub fn list(&self) -> &[WorkflowEvent] {
        &self.events
    }

    /// Vista compacta, una letra por evento, para asserts de secuencia.
    pub fn variants(&self) -> String {
        self.events
            .iter()
            .map(|e| match e.kind {
                WorkflowEventKind::FileSelected { .. } => 'F',
                WorkflowEventKind::PreviewLoaded { .. } => 'P',
                WorkflowEventKind::PreviewFailed { .. } => 'X',
                WorkflowEventKind::TypeAssigned { .. } => 'T',
                WorkflowEventKind::StrategyChosen { .. } => 'M',
                WorkflowEventKind::GateRejected { .. } => 'G',
                WorkflowEventKind::SnapshotPersisted { .. } => 'W',
                WorkflowEventKind::RedirectIssued { .. } => 'R',
                WorkflowEventKind::PaymentInitFailed { .. } => 'E',
                WorkflowEventKind::ReturnDetected { .. } => 'D',
                WorkflowEventKind::SnapshotRestored { .. } => 'L',
                WorkflowEventKind::SnapshotLost { .. } => 'O',
                WorkflowEventKind::ReportRequested { .. } => 'Q',
                WorkflowEventKind::ReportCompleted { .. } => 'A',
                WorkflowEventKind::ReportFailed { .. } => 'B',
                WorkflowEventKind::TipRequested { .. } => 'V',
                WorkflowEventKind::TipReturnDetected { .. } => 'U',
                WorkflowEventKind::WorkflowReset => 'Z',
            })
            .collect()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}
