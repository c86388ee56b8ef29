//! Normalizes client-submitted write payloads into stored text.
//!
//! Payloads arrive in the query string either verbatim (`text`) or base64
//! encoded (`b64`). Form decoding turns every `+` into a space before the
//! handler sees the value, so the base64 path restores them first.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

use crate::error::{AppError, AppResult};

/// Standard alphabet, lenient about `=` padding and trailing bits the way
/// browser `atob` is.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Resolve the write payload, if any.
///
/// Returns `Ok(None)` when neither parameter carries a value, meaning the
/// request is a read. Empty strings count as absent. `text` wins over `b64`.
pub fn decode_payload(text: Option<&str>, b64: Option<&str>) -> AppResult<Option<String>> {
    let text = text.filter(|s| !s.is_empty());
    let b64 = b64.filter(|s| !s.is_empty());

    match (text, b64) {
        (Some(text), _) => Ok(Some(text.to_owned())),
        (None, Some(b64)) => decode_base64(b64).map(Some),
        (None, None) => Ok(None),
    }
}

/// Decode a base64 payload whose `+` characters may have become spaces.
pub fn decode_base64(input: &str) -> AppResult<String> {
    let restored: String = input
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            '\t' | '\n' | '\r' | '\x0c' => None,
            c => Some(c),
        })
        .collect();

    let bytes = FORGIVING
        .decode(restored.as_bytes())
        .map_err(|_| AppError::Decode)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text.as_ref()).to_owned())
}
