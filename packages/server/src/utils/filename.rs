/// Result of validating a served image name.
#[derive(Debug)]
pub enum FilenameError {
    /// Name is empty or whitespace-only.
    Empty,
    /// Name contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Name is the `..` traversal component.
    PathTraversal,
    /// Name contains null bytes.
    NullByte,
    /// Name starts with a dot (hidden file).
    Hidden,
    /// Name contains control characters (CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Image name cannot be empty",
            Self::ContainsPathSeparator => "Invalid image name: path separators are not allowed",
            Self::PathTraversal => "Invalid image name: '..' is not allowed",
            Self::NullByte => "Invalid image name: null bytes are not allowed",
            Self::Hidden => "Invalid image name: hidden files are not allowed",
            Self::ControlCharacter => "Invalid image name: control characters are not allowed",
        }
    }
}

/// Validates a flat image filename (no directory components allowed).
///
/// Blob names are server-generated, but the serving endpoint accepts any
/// client-supplied string and must never resolve outside the uploads dir.
pub fn validate_image_name(name: &str) -> Result<&str, FilenameError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    // Reject ASCII control characters to prevent
    // HTTP header injection (e.g. CRLF in Content-Disposition).
    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}
