//! Resultado del parseo de preview: columnas, muestra de filas y diagnóstico
//! de datos faltantes.
//!
//! Estas estructuras calcan el contrato JSON del servicio de preview y quedan
//! inmutables una vez recibidas: el resto del workflow sólo las lee.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Muestra acotada del archivo para mostrar al usuario.
///
/// - `columns` define el orden de presentación (significativo: el índice de
///   columna mapea celda ↔ nombre).
/// - `rows` es row-major; una celda `None` representa un valor ausente en la
///   muestra (el servicio emite `null` para esas celdas).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ColumnPreview {
    /// Valores de muestra de una columna (hasta `limit`), para la tabla de
    /// clasificación. Celdas ausentes se omiten.
    pub fn sample_for(&self, column_index: usize, limit: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column_index).and_then(|c| c.as_deref()))
            .take(limit)
            .collect()
    }
}

/// Diagnóstico de datos faltantes producido una sola vez por el preview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissingDataInfo {
    pub has_missing_data: bool,
    #[serde(default)]
    pub columns_with_missing_data: BTreeSet<String>,
    /// Explicación legible del método de detección (opcional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<String>,
    /// Muestra acotada de ubicaciones legibles ("Wiersz 4, kolumna 'age'").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_value_locations: Vec<String>,
}

impl MissingDataInfo {
    /// Diagnóstico vacío (sin datos faltantes), útil para casos completos.
    pub fn complete() -> Self {
        MissingDataInfo { has_missing_data: false,
                          columns_with_missing_data: BTreeSet::new(),
                          detection_method: None,
                          missing_value_locations: Vec::new() }
    }
}
