//! stat-adapters: implementaciones de frontera del workflow.
//!
//! - `codec`: archivo ⇄ data URL base64 (la forma autocontenida que cruza el
//!   redirect).
//! - `encoder`: empaquetado dominio ⇄ snapshot neutral (`SessionEncoder`).
//! - `http`: clientes reqwest de los tres servicios externos.
//! - `testing`: servicios guionados en memoria para tests y demos.
pub mod codec;
pub mod encoder;
pub mod http;
pub mod testing;

pub use codec::{decode_data_url, encode_data_url, CodecError};
pub use encoder::DataUrlSessionEncoder;
pub use http::{ApiEndpoints, HttpPaymentService, HttpPreviewService, HttpReportService, ResumeStyle};
