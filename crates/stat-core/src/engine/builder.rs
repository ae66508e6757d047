//! Builder del motor: armado pieza por pieza de los colaboradores.
use crate::encoder::SessionEncoder;
use crate::engine::core::WorkflowEngine;
use crate::errors::WorkflowError;
use crate::navigator::Navigator;
use crate::services::{PaymentService, PreviewService, ReportService};
use crate::SessionStore;

pub struct EngineBuilder<S, N>
    where S: SessionStore,
          N: Navigator
{
    store: S,
    navigator: N,
    preview: Option<Box<dyn PreviewService>>,
    payment: Option<Box<dyn PaymentService>>,
    report: Option<Box<dyn ReportService>>,
    encoder: Option<Box<dyn SessionEncoder>>,
}

impl<S, N> EngineBuilder<S, N>
    where S: SessionStore,
          N: Navigator
{
    pub fn new(store: S, navigator: N) -> Self {
        EngineBuilder { store,
                        navigator,
                        preview: None,
                        payment: None,
                        report: None,
                        encoder: None }
    }

    pub fn preview(mut self, service: impl PreviewService + 'static) -> Self {
        self.preview = Some(Box::new(service));
        self
    }

    pub fn payment(mut self, service: impl PaymentService + 'static) -> Self {
        self.payment = Some(Box::new(service));
        self
    }

    pub fn report(mut self, service: impl ReportService + 'static) -> Self {
        self.report = Some(Box::new(service));
        self
    }

    pub fn encoder(mut self, encoder: impl SessionEncoder + 'static) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    /// Construye el motor; falla con `Incomplete` si falta un colaborador.
    pub fn build(self) -> Result<WorkflowEngine<S, N>, WorkflowError> {
        let preview = self.preview.ok_or(WorkflowError::Incomplete("preview service"))?;
        let payment = self.payment.ok_or(WorkflowError::Incomplete("payment service"))?;
        let report = self.report.ok_or(WorkflowError::Incomplete("report service"))?;
        let encoder = self.encoder.ok_or(WorkflowError::Incomplete("session encoder"))?;
        Ok(WorkflowEngine::new(self.store, self.navigator, preview, payment, report, encoder))
    }
}
