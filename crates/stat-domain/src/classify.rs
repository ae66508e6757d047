//! Clasificación por columna: tipo de variable estadística y estrategia para
//! datos faltantes.
//!
//! Los tokens serde son el contrato de wire con el servicio de reportes; no
//! renombrar sin coordinar con ese servicio.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{DomainError, MissingDataInfo};

/// Tipo de variable estadística asignable a una columna.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VariableType {
    /// Ignorar la columna por completo (IDs, texto libre, fechas).
    #[serde(rename = "pomiń")]
    Skip,
    #[serde(rename = "ciągła")]
    Continuous,
    #[serde(rename = "binarna")]
    Binary,
    #[serde(rename = "nominalna")]
    Nominal,
    #[serde(rename = "porzadkowa")]
    Ordinal,
}

impl VariableType {
    /// Token textual tal como viaja en el JSON de asignaciones.
    pub fn as_wire(&self) -> &'static str {
        match self {
            VariableType::Skip => "pomiń",
            VariableType::Continuous => "ciągła",
            VariableType::Binary => "binarna",
            VariableType::Nominal => "nominalna",
            VariableType::Ordinal => "porzadkowa",
        }
    }
}

/// Estrategia elegida para manejar datos faltantes.
///
/// `None` declara que los datos están completos; si no lo están, el servicio
/// de reportes debe fallar (no es responsabilidad de este lado verificarlo).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MissingDataStrategy {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "delete_rows")]
    DropRows,
    #[serde(rename = "delete_cols")]
    DropColumns,
    #[serde(rename = "impute")]
    Impute,
}

impl MissingDataStrategy {
    pub fn as_wire(&self) -> &'static str {
        match self {
            MissingDataStrategy::None => "none",
            MissingDataStrategy::DropRows => "delete_rows",
            MissingDataStrategy::DropColumns => "delete_cols",
            MissingDataStrategy::Impute => "impute",
        }
    }

    pub fn from_wire(token: &str) -> Option<Self> {
        match token {
            "none" => Some(MissingDataStrategy::None),
            "delete_rows" => Some(MissingDataStrategy::DropRows),
            "delete_cols" => Some(MissingDataStrategy::DropColumns),
            "impute" => Some(MissingDataStrategy::Impute),
            _ => Option::None,
        }
    }
}

/// Estado de clasificación de un preview: mapa ordenado columna → tipo, más
/// la selección de estrategia (ausente = todavía sin resolver).
///
/// Sin estado derivado ni caches: toda lectura recalcula sobre las
/// asignaciones vigentes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnClassification {
    types: IndexMap<String, VariableType>,
    strategy: Option<MissingDataStrategy>,
}

impl ColumnClassification {
    /// Siembra la clasificación inicial: toda columna arranca en `Skip` y la
    /// estrategia queda sin resolver.
    pub fn seed<I, S>(columns: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        let types = columns.into_iter().map(|c| (c.into(), VariableType::Skip)).collect();
        ColumnClassification { types, strategy: None }
    }

    /// Reconstruye una clasificación desde sus partes persistidas.
    pub fn from_parts(types: IndexMap<String, VariableType>, strategy: Option<MissingDataStrategy>) -> Self {
        ColumnClassification { types, strategy }
    }

    /// Única mutación de tipos: asigna `ty` a una columna conocida.
    pub fn set_type(&mut self, column: &str, ty: VariableType) -> Result<(), DomainError> {
        match self.types.get_mut(column) {
            Some(slot) => {
                *slot = ty;
                Ok(())
            }
            None => Err(DomainError::UnknownColumn(column.to_string())),
        }
    }

    /// Única mutación de estrategia. Sin validación aquí: el usuario puede
    /// elegir y re-elegir antes de enviar; la validez la impone el gate.
    pub fn set_strategy(&mut self, strategy: MissingDataStrategy) {
        self.strategy = Some(strategy);
    }

    /// Resolución automática: si el preview no reportó datos faltantes, la
    /// estrategia queda fijada en `None` sin interacción del usuario.
    pub fn resolve_strategy_for(&mut self, missing: &MissingDataInfo) {
        if !missing.has_missing_data {
            self.strategy = Some(MissingDataStrategy::None);
        }
    }

    pub fn strategy(&self) -> Option<MissingDataStrategy> {
        self.strategy
    }

    pub fn strategy_resolved(&self) -> bool {
        self.strategy.is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|k| k.as_str())
    }

    pub fn type_of(&self, column: &str) -> Option<VariableType> {
        self.types.get(column).copied()
    }

    pub fn types(&self) -> &IndexMap<String, VariableType> {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Asignaciones como JSON (objeto columna → token), el formato exacto del
    /// campo `variable_types_json` del wire.
    pub fn types_json(&self) -> String {
        // IndexMap serializa en orden de inserción, que es el orden de
        // columnas del preview.
        serde_json::to_string(&self.types).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn missing(has: bool) -> MissingDataInfo {
        MissingDataInfo { has_missing_data: has,
                          columns_with_missing_data: BTreeSet::new(),
                          detection_method: None,
                          missing_value_locations: Vec::new() }
    }

    #[test]
    fn seed_defaults_every_column_to_skip() {
        let c = ColumnClassification::seed(["id", "age", "city"]);
        assert_eq!(c.len(), 3);
        assert!(c.columns().all(|col| c.type_of(col) == Some(VariableType::Skip)));
        assert!(!c.strategy_resolved());
    }

    #[test]
    fn set_type_rejects_unknown_column() {
        let mut c = ColumnClassification::seed(["id"]);
        let err = c.set_type("edad", VariableType::Continuous).unwrap_err();
        assert_eq!(err, DomainError::UnknownColumn("edad".to_string()));
    }

    #[test]
    fn strategy_auto_resolves_only_without_missing_data() {
        let mut c = ColumnClassification::seed(["id"]);
        c.resolve_strategy_for(&missing(true));
        assert!(!c.strategy_resolved());
        c.resolve_strategy_for(&missing(false));
        assert_eq!(c.strategy(), Some(MissingDataStrategy::None));
    }

    #[test]
    fn types_json_uses_wire_tokens_in_column_order() {
        let mut c = ColumnClassification::seed(["id", "age"]);
        c.set_type("age", VariableType::Continuous).unwrap();
        assert_eq!(c.types_json(), r#"{"id":"pomiń","age":"ciągła"}"#);
    }

    #[test]
    fn strategy_wire_tokens_roundtrip() {
        for s in [MissingDataStrategy::None,
                  MissingDataStrategy::DropRows,
                  MissingDataStrategy::DropColumns,
                  MissingDataStrategy::Impute]
        {
            assert_eq!(MissingDataStrategy::from_wire(s.as_wire()), Some(s));
        }
        assert_eq!(MissingDataStrategy::from_wire("borrar"), None);
    }
}
