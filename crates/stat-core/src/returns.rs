//! Detección de retorno desde el proveedor de pagos.
//!
//! El proveedor vuelve a esta aplicación con marcadores incrustados en la
//! dirección: un discriminador de éxito/cancelación y un token de correlación
//! (flujo pagado), o `payment_status` + `report_id` (flujo de propina). Los
//! marcadores se retiran de la dirección visible EN el momento de leerlos:
//! un refresh sobre la misma dirección no puede repetir la transición.
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::markers;
use crate::navigator::Navigator;

/// Token opaco emitido por el proveedor de pagos; viaja por el redirect para
/// que el servicio de reportes asocie el pago con la solicitud original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrelationToken(pub String);

impl std::fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resultado de inspeccionar la dirección tras una carga.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// Visita normal: sin marcadores.
    NoReturn,
    Succeeded { token: CorrelationToken },
    Cancelled,
}

/// Retorno del sub-flujo de propina voluntaria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipReturn {
    pub report_id: String,
    pub accepted: bool,
}

/// Inspecciona la dirección actual buscando los marcadores del checkout
/// pagado y los retira de inmediato. Idempotente: la segunda llamada sobre la
/// misma navegación da `NoReturn`.
pub fn detect_return<N: Navigator + ?Sized>(nav: &mut N) -> ReturnOutcome {
    let location = nav.current_location();
    match location.path() {
        p if p == markers::CANCEL_PATH => {
            nav.replace_location(stripped(&location, "/"));
            ReturnOutcome::Cancelled
        }
        p if p == markers::SUCCESS_PATH => {
            let token = query_param(&location, markers::SESSION_ID);
            match token {
                Some(t) if !t.is_empty() => {
                    nav.replace_location(stripped(&location, "/"));
                    ReturnOutcome::Succeeded { token: CorrelationToken(t) }
                }
                // Path de éxito sin token: lo tratamos como visita normal
                // (dirección vieja, no un retorno real).
                _ => ReturnOutcome::NoReturn,
            }
        }
        _ => ReturnOutcome::NoReturn,
    }
}

/// Inspecciona la dirección buscando los marcadores del retorno de propina
/// (`payment_status` + `report_id`) y los retira, dejando la dirección
/// estable del reporte.
pub fn detect_tip_return<N: Navigator + ?Sized>(nav: &mut N) -> Option<TipReturn> {
    let location = nav.current_location();
    let status = query_param(&location, markers::PAYMENT_STATUS)?;
    let report_id = query_param(&location, markers::REPORT_ID)?;
    let accepted = match status.as_str() {
        markers::STATUS_SUCCESS => true,
        markers::STATUS_CANCELLED => false,
        _ => return None,
    };
    if report_id.is_empty() {
        return None;
    }
    nav.replace_location(stripped(&location, &format!("/raport/{report_id}")));
    Some(TipReturn { report_id, accepted })
}

fn query_param(location: &Url, name: &str) -> Option<String> {
    location.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
}

fn stripped(location: &Url, path: &str) -> Url {
    let mut clean = location.clone();
    clean.set_path(path);
    clean.set_query(None);
    clean.set_fragment(None);
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::InMemoryNavigator;

    fn nav_at(s: &str) -> InMemoryNavigator {
        InMemoryNavigator::at(Url::parse(s).unwrap())
    }

    #[test]
    fn fresh_visit_is_no_return() {
        let mut nav = nav_at("https://statflow.test/");
        assert_eq!(detect_return(&mut nav), ReturnOutcome::NoReturn);
    }

    #[test]
    fn success_markers_are_read_once_and_stripped() {
        let mut nav = nav_at("https://statflow.test/sukces?session_id=cs_123");
        let first = detect_return(&mut nav);
        assert_eq!(first, ReturnOutcome::Succeeded { token: CorrelationToken("cs_123".into()) });
        assert_eq!(nav.current_location().as_str(), "https://statflow.test/");

        // refresh simulado sobre la dirección ya limpia
        let second = detect_return(&mut nav);
        assert_eq!(second, ReturnOutcome::NoReturn);
    }

    #[test]
    fn cancel_path_maps_to_cancelled_and_strips() {
        let mut nav = nav_at("https://statflow.test/anulowano");
        assert_eq!(detect_return(&mut nav), ReturnOutcome::Cancelled);
        assert_eq!(nav.current_location().path(), "/");
        assert_eq!(detect_return(&mut nav), ReturnOutcome::NoReturn);
    }

    #[test]
    fn success_path_without_token_is_a_fresh_visit() {
        let mut nav = nav_at("https://statflow.test/sukces");
        assert_eq!(detect_return(&mut nav), ReturnOutcome::NoReturn);
    }

    #[test]
    fn tip_return_detects_both_statuses_and_strips() {
        let mut nav = nav_at("https://statflow.test/?payment_status=success&report_id=r-77");
        let tip = detect_tip_return(&mut nav).unwrap();
        assert!(tip.accepted);
        assert_eq!(tip.report_id, "r-77");
        assert_eq!(nav.current_location().as_str(), "https://statflow.test/raport/r-77");
        assert!(detect_tip_return(&mut nav).is_none());

        let mut nav = nav_at("https://statflow.test/?payment_status=cancelled&report_id=r-77");
        let tip = detect_tip_return(&mut nav).unwrap();
        assert!(!tip.accepted);
    }

    #[test]
    fn tip_markers_require_both_params() {
        let mut nav = nav_at("https://statflow.test/?payment_status=success");
        assert!(detect_tip_return(&mut nav).is_none());
        let mut nav = nav_at("https://statflow.test/?report_id=r-1");
        assert!(detect_tip_return(&mut nav).is_none());
    }
}
