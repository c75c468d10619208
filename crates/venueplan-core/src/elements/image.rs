//! Image payloads carried by `image` elements.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Raster formats recognised in inline image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        None
    }
}

/// What the renderer should draw for an image element.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageState {
    /// Decoded inline bitmap.
    Inline { format: ImageFormat, bytes: Vec<u8> },
    /// Bitmap still to be fetched from a URL.
    Remote(String),
    /// No usable source yet; draw a placeholder.
    Pending,
}

impl ImageState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ImageState::Pending)
    }
}

/// Resolve the image payload. Inline data wins over the URL when it decodes.
pub fn resolve_image(image_data: Option<&str>, image_url: Option<&str>) -> ImageState {
    if let Some(data) = image_data.filter(|d| !d.trim().is_empty()) {
        match decode_inline(data) {
            Some((format, bytes)) => return ImageState::Inline { format, bytes },
            None => log::warn!("Inline image data could not be decoded, trying URL"),
        }
    }

    match image_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => ImageState::Remote(url.to_string()),
        None => ImageState::Pending,
    }
}

/// Decode a `data:` URL or bare base64 payload.
fn decode_inline(data: &str) -> Option<(ImageFormat, Vec<u8>)> {
    let payload = match data.trim().strip_prefix("data:") {
        Some(rest) => {
            let (meta, body) = rest.split_once(',')?;
            if !meta.ends_with(";base64") {
                return None;
            }
            body
        }
        None => data.trim(),
    };

    let bytes = STANDARD.decode(payload).ok()?;
    let format = ImageFormat::from_magic_bytes(&bytes)?;
    Some((format, bytes))
}

/// Encode raw bytes as a `data:` URL for storage in a layout.
pub fn encode_data_url(format: ImageFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"no"), None);
    }

    #[test]
    fn test_inline_data_takes_precedence() {
        let data = encode_data_url(ImageFormat::Png, &PNG_HEADER);
        let state = resolve_image(Some(&data), Some("https://example.com/a.png"));
        assert_eq!(
            state,
            ImageState::Inline { format: ImageFormat::Png, bytes: PNG_HEADER.to_vec() }
        );
    }

    #[test]
    fn test_bad_inline_data_falls_back_to_url() {
        let state = resolve_image(Some("data:image/png;base64,@@@"), Some("https://example.com/a.png"));
        assert_eq!(state, ImageState::Remote("https://example.com/a.png".to_string()));
    }

    #[test]
    fn test_missing_sources_are_pending() {
        assert!(resolve_image(None, None).is_pending());
        assert!(resolve_image(Some("  "), Some("")).is_pending());
        assert!(resolve_image(Some("not base64!"), None).is_pending());
    }
}
