//! Short code generation.
//!
//! Codes are drawn from the operating system CSPRNG and encoded with the
//! URL-safe base64 alphabet (`A-Z a-z 0-9 - _`), then cut to the requested
//! length.

use base64::Engine as _;

/// Code length used when nothing else is configured.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Errors produced while generating a short code.
#[derive(Debug, thiserror::Error)]
pub enum CodeGenError {
    #[error("Code length must be greater than zero")]
    InvalidLength,

    #[error("Secure random source unavailable: {0}")]
    RandomSourceUnavailable(String),
}

/// Generates a cryptographically secure random short code of `length` characters.
///
/// `length` random bytes are drawn and base64-encoded without padding, which
/// always yields at least `length` characters; the result is truncated to
/// exactly `length`.
///
/// # Errors
///
/// Returns [`CodeGenError::InvalidLength`] for a zero length and
/// [`CodeGenError::RandomSourceUnavailable`] if the OS random source fails.
///
/// # Examples
///
/// ```
/// use snaplink::utils::code_generator::generate_code;
///
/// let code = generate_code(6).unwrap();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
/// ```
pub fn generate_code(length: usize) -> Result<String, CodeGenError> {
    generate_code_with(length, getrandom::fill)
}

/// Same as [`generate_code`] with a caller-supplied byte source.
pub fn generate_code_with<F>(length: usize, fill: F) -> Result<String, CodeGenError>
where
    F: FnOnce(&mut [u8]) -> Result<(), getrandom::Error>,
{
    if length == 0 {
        return Err(CodeGenError::InvalidLength);
    }

    let mut buffer = vec![0u8; length];
    fill(&mut buffer).map_err(|e| CodeGenError::RandomSourceUnavailable(e.to_string()))?;

    let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
    code.truncate(length);

    Ok(code)
}

/// Path segments served by static routes, never issued as short codes.
pub const RESERVED_CODES: &[&str] = &["health", "shorten", "stats"];

/// Returns true if `code` would be shadowed by a static route.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Returns true if `code` has the given length and only URL-safe base64 characters.
pub fn is_valid_code(code: &str, length: usize) -> bool {
    code.len() == length
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
