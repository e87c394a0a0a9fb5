//! Short opaque identifiers for server-stored bundles
//!
//! An id is 6 bytes from the OS CSPRNG (via `uuid` v4) rendered as
//! unpadded base64url, which is always exactly 8 characters.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;
use vibes_core::{Result, VibesError};

/// Length of every generated id
pub const SHORT_ID_LEN: usize = 8;

const RANDOM_BYTES: usize = 6;

/// Generate a fresh random short id
///
/// # Examples
/// ```
/// use vibes_codec::{SHORT_ID_LEN, generate_short_id, is_valid_short_id};
///
/// let id = generate_short_id();
/// assert_eq!(id.len(), SHORT_ID_LEN);
/// assert!(is_valid_short_id(&id));
/// ```
pub fn generate_short_id() -> String {
    // The first six bytes of a v4 uuid carry no version or variant bits
    let uuid = Uuid::new_v4();
    URL_SAFE_NO_PAD.encode(&uuid.as_bytes()[..RANDOM_BYTES])
}

/// Whether `id` has the shape of a generated id
pub fn is_valid_short_id(id: &str) -> bool {
    id.len() == SHORT_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Check the shape of `id` before it is used as a storage key
pub fn validate_short_id(id: &str) -> Result<&str> {
    if is_valid_short_id(id) {
        Ok(id)
    } else {
        Err(VibesError::InvalidShortId(id.to_string()))
    }
}
