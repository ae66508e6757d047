//! Cliente del servicio de sesiones de pago: checkout pagado y propina
//! voluntaria. Devuelve el destino del redirect externo; la navegación en sí
//! es asunto del motor.
use async_trait::async_trait;
use log::debug;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use stat_core::{PaymentInitError, PaymentService, RedirectTarget};
use stat_domain::{ColumnClassification, UploadedFile};

use super::{rejection_message, ApiEndpoints};

pub struct HttpPaymentService {
    client: Client,
    checkout_endpoint: Url,
    tip_endpoint: Url,
}

impl HttpPaymentService {
    pub fn new(client: Client, endpoints: &ApiEndpoints) -> Self {
        HttpPaymentService { client,
                             checkout_endpoint: endpoints.create_payment_session.clone(),
                             tip_endpoint: endpoints.create_voluntary_payment_session.clone() }
    }
}

/// Respuesta de creación de sesión: `{id?, url}`.
#[derive(Debug, Deserialize)]
struct SessionWire {
    #[serde(default)]
    id: Option<String>,
    url: String,
}

impl SessionWire {
    fn into_target(self) -> Result<RedirectTarget, PaymentInitError> {
        // Un destino ilegible cuenta como rechazo del servidor: no hay a
        // dónde navegar.
        let url = Url::parse(&self.url).map_err(|e| PaymentInitError::ServerRejected(format!("redirect target: {e}")))?;
        Ok(RedirectTarget { session_id: self.id,
                            url })
    }
}

async fn read_target(response: reqwest::Response) -> Result<RedirectTarget, PaymentInitError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PaymentInitError::ServerRejected(rejection_message(status, &body)));
    }
    let wire: SessionWire = response.json()
                                    .await
                                    .map_err(|e| PaymentInitError::ServerRejected(format!("session body: {e}")))?;
    wire.into_target()
}

#[async_trait]
impl PaymentService for HttpPaymentService {
    async fn create_checkout(&self,
                             file: &UploadedFile,
                             classification: &ColumnClassification)
                             -> Result<RedirectTarget, PaymentInitError> {
        debug!("creando sesión de pago para '{}'", file.name());
        let part = multipart::Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string())
                                                                .mime_str(file.media_type())
                                                                .map_err(|e| PaymentInitError::Network(e.to_string()))?;
        // El gate garantiza estrategia resuelta antes de llegar acá.
        let strategy = classification.strategy().map(|s| s.as_wire()).unwrap_or_default();
        let form = multipart::Form::new().part("file", part)
                                         .text("variable_types_json", classification.types_json())
                                         .text("missing_data_strategy", strategy.to_string());

        let response = self.client
                           .post(self.checkout_endpoint.clone())
                           .multipart(form)
                           .send()
                           .await
                           .map_err(|e| PaymentInitError::Network(e.to_string()))?;
        read_target(response).await
    }

    async fn create_tip_checkout(&self, report_id: &str, amount_minor: u32) -> Result<RedirectTarget, PaymentInitError> {
        debug!("creando sesión de propina para reporte {report_id} ({amount_minor})");
        let response = self.client
                           .post(self.tip_endpoint.clone())
                           .json(&json!({ "report_id": report_id, "amount": amount_minor }))
                           .send()
                           .await
                           .map_err(|e| PaymentInitError::Network(e.to_string()))?;
        read_target(response).await
    }
}
