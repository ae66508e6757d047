//! Gate de envío: precondición compartida para salir de `PreviewReady` hacia
//! el pago (variante paga) o hacia la generación directa (variante gratuita).
//!
//! La regla: hay archivo, y (no hay datos faltantes O la estrategia quedó
//! resuelta en un valor concreto). Una violación nunca cambia de fase; sólo
//! anota la fase actual con un motivo distinguible; jamás un no-op mudo.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stat_domain::{ColumnClassification, MissingDataInfo, UploadedFile};

/// Motivo tipado por el que el gate rechazó el envío.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateViolation {
    #[error("no file selected")]
    NoFile,
    /// El preview reportó datos faltantes y el usuario todavía no eligió qué
    /// hacer con ellos.
    #[error("missing-data strategy not chosen")]
    StrategyNotChosen,
}

/// Evalúa el gate sobre el estado vigente. Sin efectos: recalcula en cada
/// lectura, nunca cachea.
pub fn evaluate(file: Option<&UploadedFile>,
                missing: Option<&MissingDataInfo>,
                classification: Option<&ColumnClassification>)
                -> Result<(), GateViolation> {
    if file.is_none() {
        return Err(GateViolation::NoFile);
    }
    let classification = classification.ok_or(GateViolation::NoFile)?;
    let has_missing = missing.map(|m| m.has_missing_data).unwrap_or(false);
    if has_missing && !classification.strategy_resolved() {
        return Err(GateViolation::StrategyNotChosen);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stat_domain::MissingDataStrategy;

    fn file() -> UploadedFile {
        UploadedFile::from_bytes("dane.csv", b"id,age,city\n1,20,Radom\n".to_vec()).unwrap()
    }

    fn missing_in(cols: &[&str]) -> MissingDataInfo {
        MissingDataInfo { has_missing_data: !cols.is_empty(),
                          columns_with_missing_data: cols.iter().map(|c| c.to_string()).collect(),
                          detection_method: None,
                          missing_value_locations: Vec::new() }
    }

    #[test]
    fn passes_without_missing_data_and_all_skip() {
        // columnas ["id","age","city"], sin faltantes: la estrategia se
        // auto-resuelve y el gate pasa sin interacción del usuario
        let f = file();
        let info = missing_in(&[]);
        let mut c = ColumnClassification::seed(["id", "age", "city"]);
        c.resolve_strategy_for(&info);
        assert_eq!(evaluate(Some(&f), Some(&info), Some(&c)), Ok(()));
    }

    #[test]
    fn blocks_until_a_concrete_strategy_is_chosen() {
        let f = file();
        let info = missing_in(&["age"]);
        let mut c = ColumnClassification::seed(["id", "age", "city"]);
        c.resolve_strategy_for(&info); // no resuelve: hay faltantes
        assert_eq!(evaluate(Some(&f), Some(&info), Some(&c)),
                   Err(GateViolation::StrategyNotChosen));

        for s in [MissingDataStrategy::DropRows, MissingDataStrategy::DropColumns, MissingDataStrategy::Impute] {
            let mut chosen = c.clone();
            chosen.set_strategy(s);
            assert_eq!(evaluate(Some(&f), Some(&info), Some(&chosen)), Ok(()));
        }
    }

    #[test]
    fn requires_a_file() {
        let c = ColumnClassification::seed(["id"]);
        assert_eq!(evaluate(None, None, Some(&c)), Err(GateViolation::NoFile));
    }
}
