use super::buffer::MessageBuffer;
use crate::utils::{Bip32Path, Curve};

/// The single in-flight signing session.
pub struct SignContext {
    /// Set by the first chunk.
    pub key: Option<(Curve, Bip32Path)>,
    pub buffer: MessageBuffer,
    /// Reply with the digest only once approved.
    pub hash_only: bool,
}

impl SignContext {
    pub fn new() -> Self {
        Self {
            key: None,
            buffer: MessageBuffer::new(),
            hash_only: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.key.is_some()
    }

    pub fn reset(&mut self) {
        self.key = None;
        self.buffer.clear();
        self.hash_only = false;
    }
}

impl Default for SignContext {
    fn default() -> Self {
        Self::new()
    }
}
