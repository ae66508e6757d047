//! stat-core: máquina de estados del workflow de análisis con pago.
//!
//! El núcleo orquesta la secuencia preview → clasificación → pago externo →
//! reporte, con persistencia de sesión a través del redirect y reanudación
//! idempotente al volver. Renderizado y layout quedan fuera: la presentación
//! consume `WorkflowState` y despacha operaciones del `WorkflowEngine`.
pub mod constants;
pub mod encoder;
pub mod engine;
pub mod errors;
pub mod gate;
pub mod hashing;
pub mod journal;
pub mod navigator;
pub mod phase;
pub mod returns;
pub mod services;
pub mod session;

pub use encoder::SessionEncoder;
pub use engine::{EngineBuilder, TipStatus, WorkflowEngine, WorkflowState};
pub use errors::{PaymentInitError, PreviewError, ReportError, SnapshotError, StoreError, WorkflowError};
pub use gate::GateViolation;
pub use journal::{Journal, WorkflowEvent, WorkflowEventKind};
pub use navigator::{InMemoryNavigator, Navigator};
pub use phase::WorkflowPhase;
pub use returns::{detect_return, detect_tip_return, CorrelationToken, ReturnOutcome, TipReturn};
pub use services::{PaymentService, PreviewOutcome, PreviewService, RedirectTarget, ReportArtifact, ReportRequest,
                   ReportService};
pub use session::{InMemorySessionStore, PersistedSession, SessionStore};
