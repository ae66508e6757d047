//! Corridas de validación del workflow sobre seams en memoria.
//!
//! Cada `run_*_validation` arma el motor con servicios guionados y verifica
//! con asserts el contrato correspondiente (secuencia de eventos, consumo del
//! snapshot, idempotencia del retorno). Con el feature `fs_demo` la corrida
//! de ida y vuelta usa el store durable en disco en lugar del de memoria.
use std::sync::Arc;

use stat_adapters::testing::{preview_outcome, redirect_to, sample_file, ScriptedPaymentService,
                             ScriptedPreviewService, ScriptedReportService};
use stat_adapters::DataUrlSessionEncoder;
use stat_core::{InMemoryNavigator, InMemorySessionStore, PersistedSession, ReportArtifact, SessionStore,
                WorkflowEngine, WorkflowError, WorkflowPhase};
use url::Url;

struct Scripted {
    preview: Arc<ScriptedPreviewService>,
    payment: Arc<ScriptedPaymentService>,
    report: Arc<ScriptedReportService>,
}

impl Scripted {
    fn new() -> Self {
        Scripted { preview: Arc::new(ScriptedPreviewService::new()),
                   payment: Arc::new(ScriptedPaymentService::new()),
                   report: Arc::new(ScriptedReportService::new()) }
    }

    fn engine<S: SessionStore>(&self, store: S, navigator: InMemoryNavigator) -> WorkflowEngine<S, InMemoryNavigator> {
        match WorkflowEngine::builder(store, navigator).preview(self.preview.clone())
                                                       .payment(self.payment.clone())
                                                       .report(self.report.clone())
                                                       .encoder(DataUrlSessionEncoder)
                                                       .build()
        {
            Ok(engine) => engine,
            Err(e) => panic!("engine incompleto: {e}"),
        }
    }
}

/// Validación: flujo directo (variante gratuita) de punta a punta.
async fn run_direct_flow_validation() {
    let svc = Scripted::new();
    svc.preview.push(Ok(preview_outcome(&["id", "age", "city"], &[])));
    svc.report.push(Ok(ReportArtifact::Envelope { report_html: "<html>raport</html>".into(),
                                                  report_id: "r-1".into() }));

    let mut eng = svc.engine(InMemorySessionStore::new(), InMemoryNavigator::fresh());
    eng.select_file(sample_file()).await.expect("preview ok");
    assert!(eng.state().submit_ready(), "sin faltantes el gate pasa solo");
    eng.generate_direct().await.expect("reporte ok");
    assert_eq!(eng.state().phase, WorkflowPhase::ReportReady);
    assert_eq!(eng.journal().variants(), "FPQA");
    println!("[OK] flujo directo: {}", eng.journal().variants());
}

/// Validación: ida al pago, retorno exitoso en una carga nueva, exactamente
/// un intento de generación, y refresh inerte.
async fn run_payment_roundtrip_validation<S: SessionStore>(store: S, label: &str) {
    let svc = Scripted::new();
    svc.preview.push(Ok(preview_outcome(&["id", "age"], &["age"])));
    svc.payment.push_checkout(Ok(redirect_to("https://checkout.example/pay/demo")));
    svc.report.push(Ok(ReportArtifact::Document("<html>raport</html>".into())));

    // Carga 1: preview + estrategia + submit (persistir y redirigir)
    let mut eng = svc.engine(store, InMemoryNavigator::fresh());
    eng.select_file(sample_file()).await.expect("preview ok");
    assert!(!eng.state().submit_ready(), "con faltantes el gate exige estrategia");
    eng.choose_strategy(stat_domain::MissingDataStrategy::Impute).expect("estrategia");
    eng.submit().await.expect("submit ok");
    assert_eq!(eng.state().phase, WorkflowPhase::AwaitingExternalReturn);
    let (store, mut navigator) = eng.into_parts();
    assert!(PersistedSession::restore(&store).is_ok(), "snapshot confirmado antes del redirect");

    // Carga 2: retorno exitoso
    navigator.arrive(match Url::parse("https://statflow.test/sukces?session_id=cs_demo") {
                         Ok(u) => u,
                         Err(e) => panic!("url: {e}"),
                     });
    let mut eng = svc.engine(store, navigator);
    eng.resume().await.expect("reanudación ok");
    assert_eq!(eng.state().phase, WorkflowPhase::ReportReady);
    assert_eq!(svc.report.calls(), 1);

    // Carga 3: refresh con marcadores ya retirados y snapshot consumido
    let (store, navigator) = eng.into_parts();
    let mut eng = svc.engine(store, navigator);
    eng.resume().await.expect("refresh inerte");
    assert_eq!(eng.state().phase, WorkflowPhase::Idle);
    assert_eq!(svc.report.calls(), 1, "sin segunda generación");
    println!("[OK] ida y vuelta por pago ({label}): 1 generación, refresh inerte");
}

/// Validación: retorno exitoso sin snapshot = pérdida de datos visible.
async fn run_data_loss_validation() {
    let svc = Scripted::new();
    let mut navigator = InMemoryNavigator::fresh();
    navigator.arrive(match Url::parse("https://statflow.test/sukces?session_id=cs_perdido") {
                         Ok(u) => u,
                         Err(e) => panic!("url: {e}"),
                     });
    let mut eng = svc.engine(InMemorySessionStore::new(), navigator);
    match eng.resume().await {
        Err(WorkflowError::ReturnDataLoss(_)) => {
            assert!(matches!(eng.state().phase, WorkflowPhase::Failed { .. }));
            assert_eq!(svc.report.calls(), 0, "jamás generar sin snapshot");
            println!("[OK] pérdida de datos detectada y reportada, sin generación");
        }
        other => panic!("esperaba ReturnDataLoss, obtuve {other:?}"),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    run_direct_flow_validation().await;
    run_payment_roundtrip_validation(InMemorySessionStore::new(), "memoria").await;
    run_data_loss_validation().await;

    #[cfg(feature = "fs_demo")]
    {
        // Misma corrida de ida y vuelta, ahora sobre el store durable del
        // directorio configurado.
        let dir = statflow_rust::config::CONFIG.session.dir.clone();
        match stat_persistence::FileSessionStore::open(&dir) {
            Ok(store) => run_payment_roundtrip_validation(store, "disco").await,
            Err(e) => eprintln!("[fs_demo] no se pudo abrir {dir:?}: {e}"),
        }
    }

    println!("validaciones completas");
}
