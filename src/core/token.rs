//! Chapter-name token codec
//!
//! Chapter names are free-form Unicode but must ride inside action tokens
//! that are size-constrained and split on `:`. The codec has two arms:
//!
//! - a reversible arm: URL-safe base64 (no padding) of the UTF-8 name,
//!   used whenever the encoded form fits the token budget. Its alphabet
//!   (`A-Z a-z 0-9 _ -`) can never collide with the field separator.
//! - a lossy arm: a truncated slug for names too long to encode. Decoding
//!   is then impossible and the catalog store resolves the token by
//!   fallback matching against existing chapter names.
//!
//! Two distinct names can in principle slug-collide; chapter creation
//! rejects such names up front (see `storage::catalog::name_conflicts`),
//! so resolution never has to disambiguate.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Token budget. Keeps a full action token (prefix + subject code +
/// chapter token + one more field) inside the 64-byte callback-data
/// limits common to messaging platforms.
pub const MAX_TOKEN_LEN: usize = 32;

/// Encodes a chapter name into a delimiter-safe token.
///
/// Deterministic: the same name always yields the same token.
pub fn encode(name: &str) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(name.as_bytes());
    if encoded.len() <= MAX_TOKEN_LEN {
        return encoded;
    }
    let slugged = slug(name);
    truncate_chars(&slugged, MAX_TOKEN_LEN)
}

/// Best-effort inverse of [`encode`].
///
/// Returns the exact original name for reversible-arm tokens and `None`
/// for slug-arm tokens (or anything else that does not decode to UTF-8);
/// the caller then falls back to store matching.
pub fn decode(token: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
    String::from_utf8(bytes).ok()
}

/// Lossy slug of a chapter name: lowercase, runs of non-alphanumerics
/// collapsed to single hyphens, leading/trailing hyphens trimmed.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// Case- and whitespace-insensitive normal form used as the last
/// resolution fallback.
pub fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
