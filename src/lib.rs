//! StatFlow Rust Library
//!
//! Este crate actúa como la capa de composición de StatFlow:
//! - Expone `config` para cargar la configuración de entorno.
//! - Re-exporta los crates miembro para consumo desde `main.rs` o clientes.
//!
//! El núcleo del workflow vive en `stat-core`; las fronteras (HTTP, codec,
//! store durable) en `stat-adapters` y `stat-persistence`.

pub mod config;

pub use stat_adapters;
pub use stat_core;
pub use stat_domain;
pub use stat_persistence;

#[cfg(test)]
mod tests {
	use super::config::CONFIG;

	#[test]
	fn config_has_a_usable_api_base() {
		// con o sin .env, la base configurada tiene que parsear como URL
		let base = url::Url::parse(&CONFIG.api.base_url);
		assert!(base.is_ok(), "base_url inválida: {:?}", CONFIG.api.base_url);
		assert!(CONFIG.api.timeout_secs > 0);
	}

	#[test]
	fn endpoints_and_client_build_from_config() {
		let endpoints = super::config::create_endpoints().expect("endpoints");
		assert!(endpoints.parse_preview.as_str().ends_with("/parse-preview"));
		assert!(super::config::create_http_client().is_ok());
	}
}
