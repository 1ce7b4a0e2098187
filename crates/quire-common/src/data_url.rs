//! Inline `data:` resources.
//!
//! Only base64 payloads are supported; the media type is recorded but not
//! interpreted (the image decoder sniffs the format itself).

use base64::Engine;
use thiserror::Error;

/// Errors produced while decoding a `data:` URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    /// The string does not start with `data:`.
    #[error("not a data URL")]
    NotDataUrl,
    /// No `,` separates the metadata from the payload.
    #[error("invalid data URL: missing comma")]
    MissingComma,
    /// The metadata does not end with `;base64`.
    #[error("unsupported data URL encoding '{0}'")]
    UnsupportedEncoding(String),
    /// The base64 payload is malformed.
    #[error("base64 decode error: {0}")]
    Base64(String),
}

/// A parsed `data:` URL that can be decoded into raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// The media type, e.g. `image/png` (empty when omitted).
    pub media_type: &'a str,
    payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split a `data:` URL into its media type and base64 payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not a base64 `data:` URL.
    pub fn parse(raw: &'a str) -> Result<Self, DataUrlError> {
        let rest = raw.strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
        let (metadata, payload) = rest.split_once(',').ok_or(DataUrlError::MissingComma)?;
        let media_type = metadata
            .strip_suffix(";base64")
            .ok_or_else(|| DataUrlError::UnsupportedEncoding(metadata.to_string()))?;
        Ok(Self {
            media_type,
            payload,
        })
    }

    /// Decode the payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DataUrlError::Base64`] if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, DataUrlError> {
        base64::engine::general_purpose::STANDARD
            .decode(self.payload.trim())
            .map_err(|e| DataUrlError::Base64(e.to_string()))
    }
}

/// Returns `true` if `location` names an inline `data:` resource.
#[must_use]
pub fn is_data_url(location: &str) -> bool {
    location.starts_with("data:")
}
