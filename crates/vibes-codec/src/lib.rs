//! Bundle codec for vibes
//!
//! Two ways to move a bundle through a URL:
//!
//! - [`inline`]: the whole bundle travels in the URL as
//!   JSON → zlib deflate → unpadded base64url
//! - [`short_id`]: only an 8-character random id travels and the bundle is
//!   parked in a server-side store

pub mod inline;
pub mod short_id;

pub use inline::{decode, decode_value, encode};
pub use short_id::{SHORT_ID_LEN, generate_short_id, is_valid_short_id, validate_short_id};
