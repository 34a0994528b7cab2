use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};

use crate::utils::{Bip32Path, Curve};
use crate::AppSW;

pub mod secure;

pub type Blake2b256 = Blake2b<U32>;
pub type Blake2b160 = Blake2b<U20>;

pub const PKH_SIZE: usize = 20;
pub const HASH_SIZE: usize = 32;

/// Upper bound on an encoded signature (DER ECDSA is at most 72 bytes).
pub const MAX_SIGNATURE_SIZE: usize = 72;

pub fn blake2b_256(data: &[u8]) -> [u8; HASH_SIZE] {
    Blake2b256::digest(data).into()
}

pub fn blake2b_160(data: &[u8]) -> [u8; PKH_SIZE] {
    Blake2b160::digest(data).into()
}

/// Access to keys held by the secure element.
///
/// Implementations derive the private key from the device seed on every call and wipe it
/// before returning.
pub trait KeyProvider {
    fn public_key(&mut self, curve: Curve, path: &Bip32Path) -> Result<PublicKey, AppSW>;

    /// Signs `msg` as is. For the ECDSA curves `msg` is the 32-byte digest to sign.
    fn sign(&mut self, curve: Curve, path: &Bip32Path, msg: &[u8]) -> Result<Signature, AppSW>;
}

/// Public key in the form sent back to the host.
///
/// Ed25519 keys are kept as `0x02 || compressed point` (33 bytes), Weierstrass keys as the
/// uncompressed SEC1 point (65 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    curve: Curve,
    bytes: [u8; 65],
    len: usize,
}

impl PublicKey {
    /// Builds a key from the 65-byte `0x04 || X || Y` point produced by the key derivation.
    pub fn from_uncompressed(curve: Curve, w: &[u8; 65]) -> Self {
        let mut bytes = [0u8; 65];
        let len = match curve {
            Curve::Ed25519 => {
                bytes[0] = 0x02;
                bytes[1..33].copy_from_slice(&compress_edwards(w));
                33
            }
            Curve::Secp256k1 | Curve::Secp256r1 => {
                bytes.copy_from_slice(w);
                65
            }
        };
        Self { curve, bytes, len }
    }

    /// Builds an Ed25519 key from its 32-byte compressed encoding.
    pub fn from_ed25519(compressed: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 65];
        bytes[0] = 0x02;
        bytes[1..33].copy_from_slice(compressed);
        Self {
            curve: Curve::Ed25519,
            bytes,
            len: 33,
        }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Compressed encoding as it appears on chain: 32 bytes for Ed25519, 33 for the others.
    pub fn compressed(&self) -> ([u8; 33], usize) {
        let mut out = [0u8; 33];
        match self.curve {
            Curve::Ed25519 => {
                out[..32].copy_from_slice(&self.bytes[1..33]);
                (out, 32)
            }
            Curve::Secp256k1 | Curve::Secp256r1 => {
                out[0] = 0x02 + (self.bytes[64] & 0x01);
                out[1..].copy_from_slice(&self.bytes[1..33]);
                (out, 33)
            }
        }
    }

    /// Blake2b-160 of the compressed key.
    pub fn hash(&self) -> [u8; PKH_SIZE] {
        let (compressed, len) = self.compressed();
        blake2b_160(&compressed[..len])
    }
}

/// Edwards point compression from an uncompressed big-endian `0x04 || X || Y`.
///
/// Y is emitted little-endian with the parity of X in the top bit.
pub fn compress_edwards(w: &[u8; 65]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, b) in out.iter_mut().enumerate() {
        *b = w[64 - i];
    }
    if w[32] & 1 != 0 {
        out[31] |= 0x80;
    }
    out
}

/// Encoded signature bytes ready to be sent to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; MAX_SIGNATURE_SIZE],
    len: usize,
}

impl Signature {
    pub fn ed25519(sig: &[u8; 64]) -> Self {
        let mut bytes = [0u8; MAX_SIGNATURE_SIZE];
        bytes[..64].copy_from_slice(sig);
        Self { bytes, len: 64 }
    }

    /// DER-encoded ECDSA signature with the parity of the nonce point folded into the low bit
    /// of the first byte.
    pub fn ecdsa(der: &[u8], y_odd: bool) -> Result<Self, AppSW> {
        if der.is_empty() || der.len() > MAX_SIGNATURE_SIZE {
            return Err(AppSW::WrongLength);
        }
        let mut bytes = [0u8; MAX_SIGNATURE_SIZE];
        bytes[..der.len()].copy_from_slice(der);
        if y_odd {
            bytes[0] |= 0x01;
        }
        Ok(Self {
            bytes,
            len: der.len(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}
