//! Image encoding: raw bytes → base64 [`ImageData`] for the multimodal request.
//!
//! The mime type is sniffed from the magic bytes; formats the sniffer doesn't
//! know are labelled JPEG, which endpoints accept and re-detect themselves.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

const FALLBACK_MIME: &str = "image/jpeg";

/// Encode image bytes for the model.
pub fn encode_image(bytes: &[u8]) -> ImageData {
    let mime_type = image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME);

    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} image → {} bytes base64", mime_type, b64.len());

    ImageData::new(b64, mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1×1 transparent PNG.
    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn png_is_sniffed() {
        let bytes = STANDARD.decode(PNG_1X1).unwrap();
        let data = encode_image(&bytes);
        assert_eq!(data.mime_type, "image/png");
        assert_eq!(STANDARD.decode(&data.data).unwrap(), bytes);
        assert!(data.to_data_uri().starts_with("data:image/png;base64,iVBOR"));
    }

    #[test]
    fn unknown_bytes_fall_back_to_jpeg() {
        let data = encode_image(b"not an image");
        assert_eq!(data.mime_type, "image/jpeg");
        assert!(data.detail.is_none());
    }
}
