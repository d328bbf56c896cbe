//! Magic-byte detection for uploaded raster images.
//!
//! Upload validation must not trust the client-declared content type or the
//! file extension; only the leading bytes of the payload decide.

/// Image formats recognized by the sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// The canonical MIME type for this format.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

/// Sniff the image format from the first bytes of `data`.
///
/// Returns `None` for anything that is not JPEG, PNG, or WEBP.
pub fn sniff_image(data: &[u8]) -> Option<ImageKind> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageKind::Jpeg);
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageKind::Png);
    }
    // RIFF container with a WEBP fourcc at offset 8.
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some(ImageKind::Webp);
    }
    None
}
