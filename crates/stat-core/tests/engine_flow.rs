//! Flujo directo (variante gratuita) y comportamiento del gate.
use std::sync::Arc;

use stat_adapters::testing::{preview_outcome, sample_file, ScriptedPaymentService, ScriptedPreviewService,
                             ScriptedReportService};
use stat_adapters::DataUrlSessionEncoder;
use stat_core::{GateViolation, InMemoryNavigator, InMemorySessionStore, PreviewError, ReportArtifact, ReportError,
                WorkflowEngine, WorkflowError, WorkflowPhase};
use stat_domain::{MissingDataStrategy, VariableType};

type Engine = WorkflowEngine<InMemorySessionStore, InMemoryNavigator>;

fn engine(preview: Arc<ScriptedPreviewService>,
          payment: Arc<ScriptedPaymentService>,
          report: Arc<ScriptedReportService>)
          -> Engine {
    WorkflowEngine::builder(InMemorySessionStore::new(), InMemoryNavigator::fresh())
        .preview(preview)
        .payment(payment)
        .report(report)
        .encoder(DataUrlSessionEncoder)
        .build()
        .expect("engine completo")
}

fn services() -> (Arc<ScriptedPreviewService>, Arc<ScriptedPaymentService>, Arc<ScriptedReportService>) {
    (Arc::new(ScriptedPreviewService::new()),
     Arc::new(ScriptedPaymentService::new()),
     Arc::new(ScriptedReportService::new()))
}

#[tokio::test]
async fn direct_flow_without_missing_data_needs_no_interaction() {
    let (preview, payment, report) = services();
    preview.push(Ok(preview_outcome(&["id", "age", "city"], &[])));
    report.push(Ok(ReportArtifact::Envelope { report_html: "<html/>".into(),
                                              report_id: "r-42".into() }));
    let mut eng = engine(preview, payment, report.clone());

    eng.select_file(sample_file()).await.unwrap();
    assert_eq!(eng.state().phase, WorkflowPhase::PreviewReady);
    // estrategia auto-resuelta a `none`, todas las columnas en Skip, gate pasa
    let classification = eng.state().classification.as_ref().unwrap();
    assert_eq!(classification.strategy(), Some(MissingDataStrategy::None));
    assert!(classification.columns().all(|c| classification.type_of(c) == Some(VariableType::Skip)));
    assert!(eng.state().submit_ready());

    eng.generate_direct().await.unwrap();
    assert_eq!(eng.state().phase, WorkflowPhase::ReportReady);
    assert_eq!(eng.state().report_id.as_deref(), Some("r-42"));
    assert_eq!(report.calls(), 1);
    assert_eq!(report.last_request_was_paid(), Some(false));
    assert_eq!(eng.journal().variants(), "FPQA");
}

#[tokio::test]
async fn missing_data_blocks_the_gate_until_a_strategy_is_chosen() {
    let (preview, payment, report) = services();
    preview.push(Ok(preview_outcome(&["id", "age", "city"], &["age"])));
    let mut eng = engine(preview, payment, report.clone());

    eng.select_file(sample_file()).await.unwrap();
    assert!(!eng.state().submit_ready());

    // violación específica y distinguible, sin cambio de fase ni red
    let err = eng.generate_direct().await.unwrap_err();
    assert_eq!(err, WorkflowError::Gate(GateViolation::StrategyNotChosen));
    assert_eq!(err.to_string(), "missing-data strategy not chosen");
    assert_eq!(eng.state().phase, WorkflowPhase::PreviewReady);
    assert_eq!(eng.state().gate_notice, Some(GateViolation::StrategyNotChosen));
    assert_eq!(report.calls(), 0);

    eng.choose_strategy(MissingDataStrategy::Impute).unwrap();
    assert!(eng.state().submit_ready());
    assert_eq!(eng.state().gate_notice, None);
}

#[tokio::test]
async fn selecting_a_new_file_resets_all_classification_state() {
    let (preview, payment, report) = services();
    preview.push(Ok(preview_outcome(&["a", "b"], &[])));
    preview.push(Ok(preview_outcome(&["x"], &["x"])));
    let mut eng = engine(preview, payment, report);

    eng.select_file(sample_file()).await.unwrap();
    eng.assign_type("a", VariableType::Binary).unwrap();
    eng.choose_strategy(MissingDataStrategy::Impute).unwrap();

    eng.select_file(sample_file()).await.unwrap();
    let classification = eng.state().classification.as_ref().unwrap();
    assert_eq!(classification.len(), 1);
    assert_eq!(classification.type_of("x"), Some(VariableType::Skip));
    assert!(!classification.strategy_resolved());
    assert!(eng.state().report.is_none());
    assert!(eng.state().last_error.is_none());
}

#[tokio::test]
async fn preview_failure_is_terminal_for_the_attempt() {
    let (preview, payment, report) = services();
    preview.push(Err(PreviewError::ServerRejected("zly format pliku".into())));
    let mut eng = engine(preview, payment, report);

    let err = eng.select_file(sample_file()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Preview(PreviewError::ServerRejected(_))));
    assert!(matches!(eng.state().phase, WorkflowPhase::Failed { .. }));
    assert!(eng.state().last_error.as_deref().unwrap().contains("zly format"));

    // desde Failed no se selecciona archivo: primero dismiss
    let rejected = eng.select_file(sample_file()).await.unwrap_err();
    assert!(matches!(rejected, WorkflowError::InvalidPhase { operation: "select_file", .. }));
    eng.dismiss().unwrap();
    assert_eq!(eng.state().phase, WorkflowPhase::Idle);
}

#[tokio::test]
async fn report_failure_moves_to_failed_with_reason() {
    let (preview, payment, report) = services();
    preview.push(Ok(preview_outcome(&["id"], &[])));
    report.push(Err(ReportError::ServerRejected("analiza nie powiodła się".into())));
    let mut eng = engine(preview, payment, report);

    eng.select_file(sample_file()).await.unwrap();
    let err = eng.generate_direct().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Report(_)));
    match &eng.state().phase {
        WorkflowPhase::Failed { reason } => assert!(reason.contains("analiza nie powiodła się")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn operations_outside_their_phase_are_rejected_not_ignored() {
    let (preview, payment, report) = services();
    let mut eng = engine(preview, payment, report);

    // nada de esto vale en Idle
    assert!(matches!(eng.assign_type("id", VariableType::Binary),
                     Err(WorkflowError::InvalidPhase { operation: "assign_type", .. })));
    assert!(matches!(eng.choose_strategy(MissingDataStrategy::Impute),
                     Err(WorkflowError::InvalidPhase { .. })));
    assert!(matches!(eng.submit().await, Err(WorkflowError::InvalidPhase { operation: "submit", .. })));
    assert!(matches!(eng.tip(300).await, Err(WorkflowError::InvalidPhase { operation: "tip", .. })));
    assert!(matches!(eng.dismiss(), Err(WorkflowError::InvalidPhase { operation: "dismiss", .. })));
}

#[tokio::test]
async fn unknown_column_is_a_programming_error_condition() {
    let (preview, payment, report) = services();
    preview.push(Ok(preview_outcome(&["id"], &[])));
    let mut eng = engine(preview, payment, report);
    eng.select_file(sample_file()).await.unwrap();

    let err = eng.assign_type("no-such-column", VariableType::Nominal).unwrap_err();
    assert!(matches!(err, WorkflowError::Domain(stat_domain::DomainError::UnknownColumn(_))));
}
