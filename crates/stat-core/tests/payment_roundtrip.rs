//! Ida y vuelta por el pago externo: snapshot antes del redirect, reanudación
//! en una "carga nueva", idempotencia del retorno y pérdida de datos.
use std::sync::Arc;

use stat_adapters::testing::{preview_outcome, redirect_to, sample_file, ScriptedPaymentService,
                             ScriptedPreviewService, ScriptedReportService};
use stat_adapters::DataUrlSessionEncoder;
use stat_core::constants::keys;
use stat_core::{InMemoryNavigator, InMemorySessionStore, Navigator, PaymentInitError, PersistedSession, ReportArtifact,
                SessionStore, SnapshotError, TipStatus, WorkflowEngine, WorkflowError, WorkflowPhase};
use url::Url;

type Engine = WorkflowEngine<InMemorySessionStore, InMemoryNavigator>;

struct Services {
    preview: Arc<ScriptedPreviewService>,
    payment: Arc<ScriptedPaymentService>,
    report: Arc<ScriptedReportService>,
}

impl Services {
    fn new() -> Self {
        Services { preview: Arc::new(ScriptedPreviewService::new()),
                   payment: Arc::new(ScriptedPaymentService::new()),
                   report: Arc::new(ScriptedReportService::new()) }
    }

    fn engine(&self, store: InMemorySessionStore, navigator: InMemoryNavigator) -> Engine {
        WorkflowEngine::builder(store, navigator).preview(self.preview.clone())
                                                 .payment(self.payment.clone())
                                                 .report(self.report.clone())
                                                 .encoder(DataUrlSessionEncoder)
                                                 .build()
                                                 .expect("engine completo")
    }
}

fn success_url(token: &str) -> Url {
    Url::parse(&format!("https://statflow.test/sukces?session_id={token}")).unwrap()
}

/// Corre la primera carga hasta el redirect y devuelve (store, navigator)
/// como quedarían al abandonar la página.
async fn run_until_redirect(svc: &Services) -> (InMemorySessionStore, InMemoryNavigator) {
    svc.preview.push(Ok(preview_outcome(&["id", "age", "city"], &[])));
    svc.payment.push_checkout(Ok(redirect_to("https://checkout.example/pay/1")));

    let mut eng = svc.engine(InMemorySessionStore::new(), InMemoryNavigator::fresh());
    eng.select_file(sample_file()).await.unwrap();
    eng.submit().await.unwrap();

    assert_eq!(eng.state().phase, WorkflowPhase::AwaitingExternalReturn);
    assert_eq!(eng.journal().variants(), "FPWR");
    let (store, navigator) = eng.into_parts();
    assert_eq!(navigator.last_redirect().map(|u| u.as_str()),
               Some("https://checkout.example/pay/1"));
    // el snapshot quedó durablemente confirmado antes del redirect
    assert!(PersistedSession::restore(&store).is_ok());
    (store, navigator)
}

#[tokio::test]
async fn successful_return_generates_exactly_once_and_refresh_is_inert() {
    let svc = Services::new();
    let (store, mut navigator) = run_until_redirect(&svc).await;

    // vuelta del proveedor: carga nueva sobre el mismo store
    navigator.arrive(success_url("cs_live_1"));
    svc.report.push(Ok(ReportArtifact::Document("<html>raport</html>".into())));

    let mut eng = svc.engine(store, navigator);
    eng.resume().await.unwrap();
    assert_eq!(eng.state().phase, WorkflowPhase::ReportReady);
    assert_eq!(svc.report.calls(), 1);
    assert_eq!(svc.report.last_request_was_paid(), Some(true));
    assert_eq!(eng.journal().variants(), "DLQA");

    let (store, navigator) = eng.into_parts();
    // snapshot consumido al despachar la generación
    assert!(matches!(PersistedSession::restore(&store), Err(SnapshotError::MissingEntry(_))));

    // refresh simulado: los marcadores ya fueron retirados en la primera
    // detección, así que la segunda carga es una visita normal
    let mut again = svc.engine(store, navigator);
    again.resume().await.unwrap();
    assert_eq!(again.state().phase, WorkflowPhase::Idle);
    assert_eq!(svc.report.calls(), 1);
}

#[tokio::test]
async fn failed_generation_still_consumes_the_snapshot() {
    let svc = Services::new();
    let (store, mut navigator) = run_until_redirect(&svc).await;

    navigator.arrive(success_url("cs_live_2"));
    svc.report
       .push(Err(stat_core::ReportError::ServerRejected("bledne dane".into())));

    let mut eng = svc.engine(store, navigator);
    let err = eng.resume().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Report(_)));
    assert!(matches!(eng.state().phase, WorkflowPhase::Failed { .. }));

    // un refresh tras la falla no re-dispara trabajo facturable
    let (store, navigator) = eng.into_parts();
    assert!(PersistedSession::restore(&store).is_err());
    let mut again = svc.engine(store, navigator);
    again.resume().await.unwrap();
    assert_eq!(svc.report.calls(), 1);
}

#[tokio::test]
async fn cancelled_return_leaves_the_snapshot_for_manual_retry() {
    let svc = Services::new();
    let (store, mut navigator) = run_until_redirect(&svc).await;

    navigator.arrive(Url::parse("https://statflow.test/anulowano").unwrap());
    let mut eng = svc.engine(store, navigator);
    eng.resume().await.unwrap();

    assert_eq!(eng.state().phase, WorkflowPhase::PaymentCancelled);
    assert_eq!(svc.report.calls(), 0);
    let (store, _) = eng.into_parts();
    assert!(PersistedSession::restore(&store).is_ok());
}

#[tokio::test]
async fn payment_init_failure_recovers_to_preview_ready_with_work_intact() {
    let svc = Services::new();
    svc.preview.push(Ok(preview_outcome(&["id", "age"], &[])));
    svc.payment
       .push_checkout(Err(PaymentInitError::ServerRejected("brak dostepu do Stripe".into())));

    let mut eng = svc.engine(InMemorySessionStore::new(), InMemoryNavigator::fresh());
    eng.select_file(sample_file()).await.unwrap();

    let err = eng.submit().await.unwrap_err();
    assert!(matches!(err, WorkflowError::PaymentInit(_)));
    assert_eq!(eng.state().phase, WorkflowPhase::PreviewReady);
    assert!(eng.state().file.is_some());
    assert!(eng.state().classification.is_some());
    assert!(eng.state().last_error.as_deref().unwrap().contains("Stripe"));

    // el gate se re-pasa sin re-subir el archivo
    assert!(eng.state().submit_ready());
    assert_eq!(svc.preview.calls(), 1);
    svc.payment.push_checkout(Ok(redirect_to("https://checkout.example/pay/2")));
    eng.submit().await.unwrap();
    assert_eq!(eng.state().phase, WorkflowPhase::AwaitingExternalReturn);
    assert_eq!(svc.preview.calls(), 1);
}

#[tokio::test]
async fn success_return_without_snapshot_is_data_loss_not_success() {
    let svc = Services::new();
    let mut navigator = InMemoryNavigator::fresh();
    navigator.arrive(success_url("cs_orphan"));

    let mut eng = svc.engine(InMemorySessionStore::new(), navigator);
    let err = eng.resume().await.unwrap_err();
    match &err {
        WorkflowError::ReturnDataLoss(SnapshotError::MissingEntry(_)) => {}
        other => panic!("expected ReturnDataLoss, got {other:?}"),
    }
    // distinguible de un rechazo del servidor, y sin intento de generación
    assert!(err.to_string().contains("lost across the payment redirect"));
    assert!(matches!(eng.state().phase, WorkflowPhase::Failed { .. }));
    assert_eq!(svc.report.calls(), 0);
}

#[tokio::test]
async fn tampered_snapshot_is_data_loss_on_return() {
    let svc = Services::new();
    let (mut store, mut navigator) = run_until_redirect(&svc).await;
    store.put(keys::MISSING_DATA_STRATEGY, "impute").unwrap();
    navigator.arrive(success_url("cs_live_3"));

    let mut eng = svc.engine(store, navigator);
    let err = eng.resume().await.unwrap_err();
    assert!(matches!(err, WorkflowError::ReturnDataLoss(SnapshotError::Integrity)));
    assert_eq!(svc.report.calls(), 0);
}

#[tokio::test]
async fn tip_subflow_persists_report_id_and_detects_its_return() {
    let svc = Services::new();
    svc.preview.push(Ok(preview_outcome(&["id"], &[])));
    svc.report.push(Ok(ReportArtifact::Envelope { report_html: "<html/>".into(),
                                                  report_id: "r-77".into() }));
    svc.payment.push_tip(Ok(redirect_to("https://checkout.example/tip/1")));

    let mut eng = svc.engine(InMemorySessionStore::new(), InMemoryNavigator::fresh());
    eng.select_file(sample_file()).await.unwrap();
    eng.generate_direct().await.unwrap();
    eng.tip(300).await.unwrap();
    assert_eq!(svc.payment.tip_calls(), 1);

    let (store, mut navigator) = eng.into_parts();
    assert_eq!(store.get(keys::REPORT_ID).unwrap().as_deref(), Some("r-77"));
    assert_eq!(navigator.last_redirect().map(|u| u.as_str()),
               Some("https://checkout.example/tip/1"));

    // vuelta de la propina en una carga nueva
    navigator.arrive(Url::parse("https://statflow.test/?payment_status=success&report_id=r-77").unwrap());
    let mut eng = svc.engine(store, navigator);
    eng.resume().await.unwrap();
    assert_eq!(eng.state().phase, WorkflowPhase::ReportReady);
    assert_eq!(eng.state().tip_status, TipStatus::Succeeded);
    assert_eq!(eng.state().report_id.as_deref(), Some("r-77"));
    // la dirección quedó en la forma estable del reporte
    let (_, navigator) = eng.into_parts();
    assert_eq!(navigator.current_location().path(), "/raport/r-77");
}

#[tokio::test]
async fn tip_without_report_id_is_a_specific_error() {
    let svc = Services::new();
    svc.preview.push(Ok(preview_outcome(&["id"], &[])));
    // Documento directo: sin report_id, la propina no tiene a qué asociarse
    svc.report.push(Ok(ReportArtifact::Document("<html/>".into())));

    let mut eng = svc.engine(InMemorySessionStore::new(), InMemoryNavigator::fresh());
    eng.select_file(sample_file()).await.unwrap();
    eng.generate_direct().await.unwrap();
    assert_eq!(eng.tip(300).await.unwrap_err(), WorkflowError::MissingReportId);
}
