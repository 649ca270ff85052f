use deck_core::ShareIdGenerator;
use tracing::warn;
use uuid::Uuid;

pub const SHARE_ID_LEN: usize = 10;

/// URL-safe alphabet. 64 symbols, so masking a random byte with `0x3f`
/// picks one without bias.
pub const SHARE_ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Ten characters drawn from the OS random source.
#[derive(Clone, Copy, Default)]
pub struct RandomShareIdGenerator;

impl RandomShareIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl ShareIdGenerator for RandomShareIdGenerator {
    fn generate(&self) -> String {
        let mut buf = [0u8; SHARE_ID_LEN];
        if let Err(e) = getrandom::getrandom(&mut buf) {
            warn!(error = %e, "OS random source unavailable, falling back to uuid bytes");
            let fallback = Uuid::new_v4().into_bytes();
            buf.copy_from_slice(&fallback[fallback.len() - SHARE_ID_LEN..]);
        }
        buf.iter()
            .map(|b| SHARE_ID_ALPHABET[(b & 0x3f) as usize] as char)
            .collect()
    }
}
