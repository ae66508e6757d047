//! Motor del workflow: despacho de transiciones sobre el estado explícito.
//!
//! Responsable de secuenciar los pasos asíncronos, imponer qué operación vale
//! en qué fase, persistir el snapshot antes del redirect externo y reconstruir
//! la fase al volver. No renderiza nada: estado + transiciones puras de
//! efectos de red/almacenamiento, consumidas por una presentación observadora.
use stat_domain::{MissingDataStrategy, UploadedFile, VariableType};

use crate::encoder::SessionEncoder;
use crate::engine::state::{TipStatus, WorkflowState};
use crate::errors::{ReportError, WorkflowError};
use crate::gate;
use crate::journal::{Journal, WorkflowEventKind};
use crate::navigator::Navigator;
use crate::phase::WorkflowPhase;
use crate::returns::{detect_return, detect_tip_return, ReturnOutcome};
use crate::services::{PaymentService, PreviewService, ReportArtifact, ReportRequest, ReportService};
use crate::session::PersistedSession;
use crate::SessionStore;

/// Máquina de estados del workflow, genérica en los dos recursos que cruzan
/// el límite de la página (store de sesión y navegación) y con los servicios
/// externos inyectados por contrato.
pub struct WorkflowEngine<S, N>
    where S: SessionStore,
          N: Navigator
{
    store: S,
    navigator: N,
    preview: Box<dyn PreviewService>,
    payment: Box<dyn PaymentService>,
    report: Box<dyn ReportService>,
    encoder: Box<dyn SessionEncoder>,
    state: WorkflowState,
    journal: Journal,
}

impl<S, N> WorkflowEngine<S, N>
    where S: SessionStore,
          N: Navigator
{
    pub fn new(store: S,
               navigator: N,
               preview: Box<dyn PreviewService>,
               payment: Box<dyn PaymentService>,
               report: Box<dyn ReportService>,
               encoder: Box<dyn SessionEncoder>)
               -> Self {
        WorkflowEngine { store,
                         navigator,
                         preview,
                         payment,
                         report,
                         encoder,
                         state: WorkflowState::new(),
                         journal: Journal::new() }
    }

    /// Crea un builder para armar el motor pieza por pieza.
    pub fn builder(store: S, navigator: N) -> super::builder::EngineBuilder<S, N> {
        super::builder::EngineBuilder::new(store, navigator)
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Desarma el motor devolviendo store y navegador (para simular una
    /// recarga: la carga siguiente construye un motor nuevo sobre ambos).
    pub fn into_parts(self) -> (S, N) {
        (self.store, self.navigator)
    }

    fn invalid(&self, operation: &'static str) -> WorkflowError {
        WorkflowError::InvalidPhase { operation,
                                      phase: self.state.phase.label().to_string() }
    }

    /// Gate de envío: en violación anota la fase (sin cambiarla), registra el
    /// evento y devuelve el motivo tipado.
    fn check_gate(&mut self) -> Result<(), WorkflowError> {
        match gate::evaluate(self.state.file.as_ref(),
                             self.state.missing.as_ref(),
                             self.state.classification.as_ref())
        {
            Ok(()) => {
                self.state.gate_notice = None;
                Ok(())
            }
            Err(violation) => {
                self.state.gate_notice = Some(violation);
                self.journal.append(WorkflowEventKind::GateRejected { violation });
                Err(violation.into())
            }
        }
    }

    /// Selección de archivo: Idle/PreviewReady → PreviewLoading → PreviewReady
    /// o Failed. Re-invocar con un archivo nuevo descarta incondicionalmente
    /// toda clasificación previa y el snapshot persistido (reset completo).
    pub async fn select_file(&mut self, file: UploadedFile) -> Result<(), WorkflowError> {
        if !matches!(self.state.phase, WorkflowPhase::Idle | WorkflowPhase::PreviewReady) {
            return Err(self.invalid("select_file"));
        }

        self.state.preview = None;
        self.state.missing = None;
        self.state.classification = None;
        self.state.report = None;
        self.state.report_id = None;
        self.state.last_error = None;
        self.state.gate_notice = None;
        self.state.tip_status = TipStatus::None;
        PersistedSession::clear(&mut self.store)?;

        self.journal.append(WorkflowEventKind::FileSelected { name: file.name().to_string(),
                                                              content_hash: file.content_hash() });
        self.state.phase = WorkflowPhase::PreviewLoading;

        let outcome = self.preview.parse_preview(&file).await;
        self.state.file = Some(file);

        match outcome {
            Ok(preview_outcome) => {
                let mut classification = stat_domain::ColumnClassification::seed(preview_outcome.columns.clone());
                classification.resolve_strategy_for(&preview_outcome.missing);
                self.journal
                    .append(WorkflowEventKind::PreviewLoaded { column_count: preview_outcome.columns.len(),
                                                               has_missing_data:
                                                                   preview_outcome.missing.has_missing_data });
                self.state.preview = Some(preview_outcome.preview);
                self.state.missing = Some(preview_outcome.missing);
                self.state.classification = Some(classification);
                self.state.phase = WorkflowPhase::PreviewReady;
                Ok(())
            }
            Err(e) => {
                // Sin estado estable previo al que volver: el preview fallido
                // es terminal para este intento.
                self.journal.append(WorkflowEventKind::PreviewFailed { error: e.clone() });
                self.state.last_error = Some(e.to_string());
                self.state.phase = WorkflowPhase::Failed { reason: e.to_string() };
                Err(e.into())
            }
        }
    }

    /// Edición de clasificación: self-loop en PreviewReady.
    pub fn assign_type(&mut self, column: &str, variable_type: VariableType) -> Result<(), WorkflowError> {
        if self.state.phase != WorkflowPhase::PreviewReady {
            return Err(self.invalid("assign_type"));
        }
        match self.state.classification.as_mut() {
            Some(classification) => classification.set_type(column, variable_type)?,
            None => return Err(self.invalid("assign_type")),
        }
        self.journal.append(WorkflowEventKind::TypeAssigned { column: column.to_string(),
                                                              variable_type });
        Ok(())
    }

    /// Selección de estrategia: self-loop en PreviewReady, sin validación
    /// (el usuario puede re-elegir; la validez la impone el gate al enviar).
    pub fn choose_strategy(&mut self, strategy: MissingDataStrategy) -> Result<(), WorkflowError> {
        if self.state.phase != WorkflowPhase::PreviewReady {
            return Err(self.invalid("choose_strategy"));
        }
        match self.state.classification.as_mut() {
            Some(classification) => classification.set_strategy(strategy),
            None => return Err(self.invalid("choose_strategy")),
        }
        self.state.gate_notice = None;
        self.journal.append(WorkflowEventKind::StrategyChosen { strategy });
        Ok(())
    }

    /// Envío pagado: PreviewReady → PaymentInitiating → AwaitingExternalReturn
    /// (con navegación entregada) o de vuelta a PreviewReady en error de
    /// inicio, sin perder archivo ni clasificación.
    pub async fn submit(&mut self) -> Result<(), WorkflowError> {
        if self.state.phase != WorkflowPhase::PreviewReady {
            return Err(self.invalid("submit"));
        }
        self.check_gate()?;
        self.state.phase = WorkflowPhase::PaymentInitiating;

        // Snapshot ANTES del request: el redirect descarta la memoria de la
        // página; lo no persistido (y confirmado) se pierde.
        let persisted = {
            let file = self.state.file.as_ref().ok_or(gate::GateViolation::NoFile)?;
            let classification = self.state.classification.as_ref().ok_or(gate::GateViolation::NoFile)?;
            self.encoder
                .encode(file, classification, None)
                .map_err(WorkflowError::SnapshotWrite)
                .and_then(|snapshot| {
                    snapshot.persist(&mut self.store)
                            .map_err(WorkflowError::from)
                            .map(|()| snapshot)
                })
        };
        let snapshot = match persisted {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Sin snapshot confirmado no hay redirect: se vuelve al
                // estado estable con el trabajo del usuario intacto.
                self.state.phase = WorkflowPhase::PreviewReady;
                self.state.last_error = Some(e.to_string());
                return Err(e);
            }
        };
        self.journal.append(WorkflowEventKind::SnapshotPersisted { fingerprint: snapshot.fingerprint() });

        let outcome = {
            let file = self.state.file.as_ref().ok_or(gate::GateViolation::NoFile)?;
            let classification = self.state.classification.as_ref().ok_or(gate::GateViolation::NoFile)?;
            self.payment.create_checkout(file, classification).await
        };

        match outcome {
            Ok(target) => {
                self.state.phase = WorkflowPhase::AwaitingExternalReturn;
                self.journal.append(WorkflowEventKind::RedirectIssued { url: target.url.to_string() });
                self.navigator.redirect(&target.url);
                // Tras redirect() no corre más código de esta carga.
                Ok(())
            }
            Err(e) => {
                // Archivo y clasificación siguen válidos: se vuelve al estado
                // estable y el reenvío queda a un click de distancia.
                self.journal.append(WorkflowEventKind::PaymentInitFailed { error: e.clone() });
                self.state.last_error = Some(e.to_string());
                self.state.phase = WorkflowPhase::PreviewReady;
                Err(e.into())
            }
        }
    }

    /// Generación directa (variante gratuita): mismo gate que el envío pagado,
    /// PreviewReady → ReportGenerating → ReportReady/Failed.
    pub async fn generate_direct(&mut self) -> Result<(), WorkflowError> {
        if self.state.phase != WorkflowPhase::PreviewReady {
            return Err(self.invalid("generate_direct"));
        }
        self.check_gate()?;
        self.state.report = None;
        self.state.report_id = None;
        self.state.tip_status = TipStatus::None;
        self.state.phase = WorkflowPhase::ReportGenerating;
        self.journal.append(WorkflowEventKind::ReportRequested { paid: false });

        let outcome = {
            let file = self.state.file.as_ref().ok_or(gate::GateViolation::NoFile)?;
            let classification = self.state.classification.as_ref().ok_or(gate::GateViolation::NoFile)?;
            self.report.generate(ReportRequest::Direct { file, classification }).await
        };
        self.finish_generation(outcome)
    }

    /// Reanudación en frío: reconstruye la fase desde la dirección de retorno
    /// y el snapshot. Operación de carga de página; sólo vale desde Idle.
    ///
    /// - Sin marcadores: visita normal, queda en Idle.
    /// - Cancelado: PaymentCancelled; el snapshot queda intacto para el
    ///   reintento manual.
    /// - Exitoso: snapshot restaurado y validado (ausente/corrupto = pérdida
    ///   de datos, error fatal visible), exactamente un intento de generación,
    ///   snapshot consumido al despacharlo, gane o pierda.
    pub async fn resume(&mut self) -> Result<(), WorkflowError> {
        if self.state.phase != WorkflowPhase::Idle {
            return Err(self.invalid("resume"));
        }

        // Marcadores de propina primero: conjunto disjunto de params, no
        // compite con los del checkout pagado.
        if let Some(tip) = detect_tip_return(&mut self.navigator) {
            self.journal.append(WorkflowEventKind::TipReturnDetected { report_id: tip.report_id.clone(),
                                                                       accepted: tip.accepted });
            self.state.report_id = Some(tip.report_id);
            self.state.tip_status = if tip.accepted { TipStatus::Succeeded } else { TipStatus::Cancelled };
            self.state.phase = WorkflowPhase::ReportReady;
            PersistedSession::clear(&mut self.store)?;
            return Ok(());
        }

        match detect_return(&mut self.navigator) {
            ReturnOutcome::NoReturn => Ok(()),
            ReturnOutcome::Cancelled => {
                self.journal.append(WorkflowEventKind::ReturnDetected { outcome: "cancelled".to_string() });
                self.state.last_error = Some("payment cancelled; the report was not generated".to_string());
                self.state.phase = WorkflowPhase::PaymentCancelled;
                Ok(())
            }
            ReturnOutcome::Succeeded { token } => {
                self.journal.append(WorkflowEventKind::ReturnDetected { outcome: "succeeded".to_string() });
                self.state.phase = WorkflowPhase::AwaitingExternalReturn;

                let snapshot = match PersistedSession::restore(&self.store) {
                    Ok(s) => s,
                    Err(e) => return self.fail_data_loss(e),
                };
                let (file, classification) = match self.encoder.decode(&snapshot) {
                    Ok(parts) => parts,
                    Err(e) => return self.fail_data_loss(e),
                };
                self.journal.append(WorkflowEventKind::SnapshotRestored { fingerprint: snapshot.fingerprint() });
                self.state.report_id = snapshot.report_id.clone();
                self.state.file = Some(file);
                self.state.classification = Some(classification);

                self.state.phase = WorkflowPhase::ReportGenerating;
                self.journal.append(WorkflowEventKind::ReportRequested { paid: true });
                let outcome = {
                    let file = self.state.file.as_ref().ok_or(gate::GateViolation::NoFile)?;
                    let classification = self.state.classification.as_ref().ok_or(gate::GateViolation::NoFile)?;
                    self.report
                        .generate(ReportRequest::Paid { token: &token,
                                                        file,
                                                        classification })
                        .await
                };
                // El snapshot se consume con el intento, éxito o error: un
                // refresh posterior no puede re-disparar trabajo facturable.
                PersistedSession::clear(&mut self.store)?;
                self.finish_generation(outcome)
            }
        }
    }

    /// Propina voluntaria post-reporte: invocación paralela del coordinador de
    /// pagos keyed por el id de reporte. No pasa por el gate y no cambia la
    /// fase (la navegación descarta la página de todos modos).
    pub async fn tip(&mut self, amount_minor: u32) -> Result<(), WorkflowError> {
        if self.state.phase != WorkflowPhase::ReportReady {
            return Err(self.invalid("tip"));
        }
        let report_id = self.state.report_id.clone().ok_or(WorkflowError::MissingReportId)?;

        // Respaldo bajo clave fija: los marcadores de retorno traen el id,
        // el snapshot cubre el caso de marcadores perdidos.
        self.store.put(crate::constants::keys::REPORT_ID, &report_id)?;
        self.store.commit()?;
        self.journal.append(WorkflowEventKind::TipRequested { report_id: report_id.clone(),
                                                              amount_minor });

        match self.payment.create_tip_checkout(&report_id, amount_minor).await {
            Ok(target) => {
                self.journal.append(WorkflowEventKind::RedirectIssued { url: target.url.to_string() });
                self.navigator.redirect(&target.url);
                Ok(())
            }
            Err(e) => {
                self.journal.append(WorkflowEventKind::PaymentInitFailed { error: e.clone() });
                self.state.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Descarta una fase terminal y vuelve a Idle con reset completo
    /// (incluido el snapshot persistido).
    pub fn dismiss(&mut self) -> Result<(), WorkflowError> {
        if !self.state.phase.is_terminal() {
            return Err(self.invalid("dismiss"));
        }
        PersistedSession::clear(&mut self.store)?;
        self.state.reset();
        self.journal.append(WorkflowEventKind::WorkflowReset);
        Ok(())
    }

    fn finish_generation(&mut self, outcome: Result<ReportArtifact, ReportError>) -> Result<(), WorkflowError> {
        match outcome {
            Ok(artifact) => {
                self.state.report_id = artifact.report_id().map(str::to_string);
                self.journal
                    .append(WorkflowEventKind::ReportCompleted { report_id: self.state.report_id.clone() });
                self.state.report = Some(artifact);
                self.state.phase = WorkflowPhase::ReportReady;
                Ok(())
            }
            Err(e) => {
                self.journal.append(WorkflowEventKind::ReportFailed { error: e.clone() });
                self.state.last_error = Some(e.to_string());
                self.state.phase = WorkflowPhase::Failed { reason: e.to_string() };
                Err(e.into())
            }
        }
    }

    fn fail_data_loss(&mut self, cause: crate::errors::SnapshotError) -> Result<(), WorkflowError> {
        self.journal.append(WorkflowEventKind::SnapshotLost { error: cause.clone() });
        let err = WorkflowError::ReturnDataLoss(cause);
        self.state.last_error = Some(err.to_string());
        self.state.phase = WorkflowPhase::Failed { reason: err.to_string() };
        Err(err)
    }
}
