use blake2::Digest;
use zeroize::Zeroize;

use crate::config::{BLAKE2B_BLOCK, MESSAGE_CAPACITY};
use crate::crypto::{Blake2b256, HASH_SIZE};
use crate::AppSW;

/// Reassembles a chunked message while hashing it.
///
/// Every appended byte goes to the Blake2b-256 state, so the digest does not depend on where
/// the chunks were split. The bytes are also kept resident, up to [`MESSAGE_CAPACITY`], for
/// parsing. When `streaming` is allowed, full hash blocks are dropped from residence instead
/// of failing; such a message is `folded` and can no longer be parsed as a whole.
pub struct MessageBuffer {
    bytes: [u8; MESSAGE_CAPACITY],
    len: usize,
    total: usize,
    first: Option<u8>,
    folded: bool,
    hasher: Blake2b256,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0u8; MESSAGE_CAPACITY],
            len: 0,
            total: 0,
            first: None,
            folded: false,
            hasher: Blake2b256::new(),
        }
    }

    pub fn append(&mut self, chunk: &[u8], streaming: bool) -> Result<(), AppSW> {
        if self.len + chunk.len() > MESSAGE_CAPACITY {
            if !streaming {
                log::debug!("message exceeds {} bytes", MESSAGE_CAPACITY);
                return Err(AppSW::ParseError);
            }
            self.fold();
            if self.len + chunk.len() > MESSAGE_CAPACITY {
                return Err(AppSW::ParseError);
            }
        }
        if self.first.is_none() {
            self.first = chunk.first().copied();
        }
        self.hasher.update(chunk);
        self.bytes[self.len..self.len + chunk.len()].copy_from_slice(chunk);
        self.len += chunk.len();
        self.total += chunk.len();
        Ok(())
    }

    /// Drops the complete blocks already absorbed by the hash, keeping the partial one.
    fn fold(&mut self) {
        let keep = self.len % BLAKE2B_BLOCK;
        let drop = self.len - keep;
        if drop == 0 {
            return;
        }
        self.bytes.copy_within(drop..self.len, 0);
        self.bytes[keep..self.len].zeroize();
        self.len = keep;
        self.folded = true;
    }

    /// The whole message, unless part of it has been folded away.
    pub fn message(&self) -> Option<&[u8]> {
        if self.folded {
            None
        } else {
            Some(&self.bytes[..self.len])
        }
    }

    /// First byte of the message, kept across folding.
    pub fn first_byte(&self) -> Option<u8> {
        self.first
    }

    pub fn total_len(&self) -> usize {
        self.total
    }

    #[cfg(test)]
    pub fn is_folded(&self) -> bool {
        self.folded
    }

    /// Blake2b-256 of everything appended.
    pub fn digest(&self) -> [u8; HASH_SIZE] {
        self.hasher.clone().finalize().into()
    }

    pub fn clear(&mut self) {
        self.bytes.zeroize();
        self.len = 0;
        self.total = 0;
        self.first = None;
        self.folded = false;
        self.hasher = Blake2b256::new();
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MessageBuffer {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
