use alloc::string::String;
use core::str;

use numtoa::NumToA;

use crate::config::MAX_BIP32_LEN;
use crate::AppSW;

/// Curve a key is derived on, as selected by P2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Curve {
    #[default]
    Ed25519 = 0,
    Secp256k1 = 1,
    Secp256r1 = 2,
}

impl TryFrom<u8> for Curve {
    type Error = AppSW;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Curve::Ed25519),
            1 => Ok(Curve::Secp256k1),
            2 => Ok(Curve::Secp256r1),
            _ => Err(AppSW::WrongParam),
        }
    }
}

impl Curve {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// BIP32 path stored as an array of [`u32`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Bip32Path {
    len: u8,
    components: [u32; MAX_BIP32_LEN],
}

impl AsRef<[u32]> for Bip32Path {
    fn as_ref(&self) -> &[u32] {
        &self.components[..self.len as usize]
    }
}

impl Bip32Path {
    pub fn new(components: &[u32]) -> Result<Self, AppSW> {
        if components.is_empty() || components.len() > MAX_BIP32_LEN {
            return Err(AppSW::WrongValues);
        }
        let mut path = Bip32Path {
            len: components.len() as u8,
            components: [0; MAX_BIP32_LEN],
        };
        path.components[..components.len()].copy_from_slice(components);
        Ok(path)
    }

    /// Reads a path at the start of `data`, returning it with the number of bytes consumed.
    ///
    /// Wire format is one count byte followed by that many big-endian components.
    /// A buffer too short for the declared count is a length error, a count of 0 or above
    /// [`MAX_BIP32_LEN`] is a value error.
    pub fn read(data: &[u8]) -> Result<(Self, usize), AppSW> {
        let count = *data.first().ok_or(AppSW::WrongLengthForInstruction)? as usize;
        let end = 1 + count * 4;
        if data.len() < end {
            return Err(AppSW::WrongLengthForInstruction);
        }
        if count == 0 || count > MAX_BIP32_LEN {
            return Err(AppSW::WrongValues);
        }

        let mut path = Bip32Path {
            len: count as u8,
            components: [0; MAX_BIP32_LEN],
        };
        for (slot, chunk) in path.components.iter_mut().zip(data[1..end].chunks_exact(4)) {
            *slot = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok((path, end))
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Wire encoding: count byte then big-endian components.
    pub fn to_wire(&self, out: &mut alloc::vec::Vec<u8>) {
        out.push(self.len);
        for c in self.as_ref() {
            out.extend_from_slice(&c.to_be_bytes());
        }
    }
}

impl TryFrom<&[u8]> for Bip32Path {
    type Error = AppSW;

    /// Constructs a [`Bip32Path`] from a buffer holding nothing but an encoded path.
    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        let (path, consumed) = Bip32Path::read(data)?;
        if consumed != data.len() {
            return Err(AppSW::WrongLength);
        }
        Ok(path)
    }
}

pub fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Decimal rendering of an unsigned integer.
pub fn number_to_string(n: u64) -> String {
    let mut buf = [0u8; 20];
    let digits = n.numtoa(10, &mut buf);
    String::from(str::from_utf8(digits).unwrap_or("0"))
}

/// Renders an amount of mutez as tez, dropping trailing zero decimals.
pub fn microtez_to_string(mutez: u64) -> String {
    let whole = mutez / 1_000_000;
    let mut frac = mutez % 1_000_000;
    let mut out = number_to_string(whole);
    if frac != 0 {
        let mut digits = 6;
        while frac % 10 == 0 {
            frac /= 10;
            digits -= 1;
        }
        let frac_str = number_to_string(frac);
        out.push('.');
        for _ in frac_str.len()..digits {
            out.push('0');
        }
        out.push_str(&frac_str);
    }
    out
}
