//! Cliente del servicio de preview: una subida = una invocación.
use async_trait::async_trait;
use log::debug;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use stat_core::{PreviewError, PreviewOutcome, PreviewService};
use stat_domain::{ColumnPreview, MissingDataInfo, UploadedFile};

use super::{rejection_message, ApiEndpoints};

pub struct HttpPreviewService {
    client: Client,
    endpoint: Url,
}

impl HttpPreviewService {
    pub fn new(client: Client, endpoints: &ApiEndpoints) -> Self {
        HttpPreviewService { client,
                             endpoint: endpoints.parse_preview.clone() }
    }
}

/// Forma de wire de la respuesta del preview.
#[derive(Debug, Deserialize)]
struct PreviewWire {
    columns: Vec<String>,
    preview_data: Vec<Vec<serde_json::Value>>,
    missing_data_info: MissingDataInfo,
}

impl PreviewWire {
    fn into_outcome(self) -> PreviewOutcome {
        // Las celdas llegan como JSON arbitrario (string, número o null);
        // null marca valor ausente en la muestra.
        let rows = self.preview_data
                       .into_iter()
                       .map(|row| row.into_iter().map(cell_to_text).collect())
                       .collect();
        let preview = ColumnPreview { columns: self.columns.clone(),
                                      rows };
        PreviewOutcome { columns: self.columns,
                         preview,
                         missing: self.missing_data_info }
    }
}

fn cell_to_text(cell: serde_json::Value) -> Option<String> {
    match cell {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl PreviewService for HttpPreviewService {
    async fn parse_preview(&self, file: &UploadedFile) -> Result<PreviewOutcome, PreviewError> {
        debug!("subiendo '{}' ({} bytes) a {}", file.name(), file.len(), self.endpoint);
        let part = multipart::Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string())
                                                                .mime_str(file.media_type())
                                                                .map_err(|e| PreviewError::Network(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self.client
                           .post(self.endpoint.clone())
                           .multipart(form)
                           .send()
                           .await
                           .map_err(|e| PreviewError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PreviewError::ServerRejected(rejection_message(status, &body)));
        }

        let wire: PreviewWire = response.json()
                                        .await
                                        .map_err(|e| PreviewError::MalformedResponse(e.to_string()))?;
        Ok(wire.into_outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_decodes_cells_and_nulls() {
        let wire: PreviewWire = serde_json::from_value(json!({
            "columns": ["id", "age"],
            "preview_data": [["1", 20], [null, "31"]],
            "missing_data_info": {
                "has_missing_data": true,
                "columns_with_missing_data": ["id"],
                "missing_value_locations": ["Wiersz 3, kolumna 'id'"]
            }
        })).unwrap();
        let outcome = wire.into_outcome();
        assert_eq!(outcome.columns, vec!["id", "age"]);
        assert_eq!(outcome.preview.rows[0], vec![Some("1".to_string()), Some("20".to_string())]);
        assert_eq!(outcome.preview.rows[1][0], None);
        assert!(outcome.missing.has_missing_data);
        assert!(outcome.missing.columns_with_missing_data.contains("id"));
    }
}
