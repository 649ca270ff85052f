//! # deck-auth-simple
//!
//! Credential plumbing for deckshare: Argon2 password hashing, random share
//! identifiers and HS256 bearer tokens.

mod hashing;
mod share_id;
mod token;

pub use hashing::Argon2Hasher;
pub use share_id::{RandomShareIdGenerator, SHARE_ID_ALPHABET, SHARE_ID_LEN};
pub use token::{Claims, JwtIdentityProvider};
