//! Security utilities for handling sensitive cryptographic material
//!
//! RAII wrappers and helpers making sure secrets are zeroed after use and compared in
//! constant time.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Fixed-size buffer for secret material, wiped when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SensitiveBytes<const N: usize> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> SensitiveBytes<N> {
    /// Create a new zeroed sensitive buffer
    pub fn new() -> Self {
        Self {
            data: [0u8; N],
            len: 0,
        }
    }

    /// Copy data from a slice, truncating if necessary
    pub fn copy_from_slice(&mut self, src: &[u8]) {
        let len = core::cmp::min(N, src.len());
        self.data[..len].copy_from_slice(&src[..len]);
        self.len = len;
    }

    /// Bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl<const N: usize> Default for SensitiveBytes<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant-time comparison of byte slices.
///
/// Length is not secret; slices of different lengths compare unequal immediately.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
