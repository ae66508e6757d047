//! Codec archivo ⇄ data URL.
//!
//! El snapshot necesita el archivo en una forma autocontenida de texto plano
//! (el retorno del redirect no recibe handles vivos). Usamos el formato
//! `data:<media type>;base64,<payload>`: lleva el media type adentro, así el
//! store no necesita una clave aparte para él.
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

const SCHEME: &str = "data:";
const SEPARATOR: &str = ";base64,";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("not a base64 data URL")]
    NotADataUrl,
    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

/// Codifica bytes como data URL base64.
pub fn encode_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("{SCHEME}{media_type}{SEPARATOR}{}", STANDARD.encode(bytes))
}

/// Decodifica una data URL a `(media type, bytes)`. Byte-idéntico respecto a
/// lo codificado.
pub fn decode_data_url(input: &str) -> Result<(String, Vec<u8>), CodecError> {
    let rest = input.strip_prefix(SCHEME).ok_or(CodecError::NotADataUrl)?;
    let (media_type, payload) = rest.split_once(SEPARATOR).ok_or(CodecError::NotADataUrl)?;
    let bytes = STANDARD.decode(payload).map_err(|e| CodecError::Base64(e.to_string()))?;
    Ok((media_type.to_string(), bytes))
}
