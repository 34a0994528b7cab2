use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

use super::Step;
use crate::config::MAX_APDU_SIZE;
use crate::crypto::secure::SensitiveBytes;
use crate::crypto::KeyProvider;
use crate::utils::{Bip32Path, Curve};
use crate::AppSW;

/// Fixed value signed to obtain material bound to the key.
const HMAC_KEY_SEED: [u8; 32] = [
    0x6c, 0x4e, 0x7e, 0x70, 0x6c, 0x54, 0xd3, 0x67, 0xc8, 0x7a, 0x8d, 0x89, 0xc1, 0x6a, 0xdf, 0xe0,
    0x6c, 0xb5, 0x68, 0x0c, 0xb7, 0xd1, 0x8e, 0x62, 0x5a, 0x90, 0x47, 0x5e, 0xc0, 0xdb, 0xdb, 0x9f,
];

/// HMAC-SHA256 of the data following the path, keyed by SHA-512 of the key's signature over
/// [`HMAC_KEY_SEED`].
pub fn handler_hmac<K: KeyProvider>(
    keys: &mut K,
    p1: u8,
    p2: u8,
    data: &[u8],
) -> Result<Step, AppSW> {
    if p1 != 0 {
        return Err(AppSW::WrongParam);
    }
    if data.len() > MAX_APDU_SIZE {
        return Err(AppSW::WrongLengthForInstruction);
    }
    let curve = Curve::try_from(p2)?;
    let (path, consumed) = Bip32Path::read(data)?;

    let signature = keys.sign(curve, &path, &HMAC_KEY_SEED)?;
    let mut key = SensitiveBytes::<64>::new();
    key.copy_from_slice(&Sha512::digest(signature.as_bytes()));

    let mut mac =
        Hmac::<Sha256>::new_from_slice(key.as_slice()).map_err(|_| AppSW::WrongLength)?;
    mac.update(&data[consumed..]);
    Ok(Step::Reply(mac.finalize().into_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{default_path, path, path_bytes};
    use crate::testing::SoftKeys;
    use alloc::vec::Vec;

    fn run(curve: u8, p: &Bip32Path, msg: &[u8]) -> Vec<u8> {
        let mut data = path_bytes(p);
        data.extend_from_slice(msg);
        match handler_hmac(&mut SoftKeys::new(), 0, curve, &data) {
            Ok(Step::Reply(mac)) => mac,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_hmac_is_deterministic_per_key() {
        let a = run(1, &default_path(), b"hello");
        assert_eq!(a.len(), 32);
        assert_eq!(a, run(1, &default_path(), b"hello"));
        assert_ne!(a, run(1, &default_path(), b"hellp"));
        assert_ne!(a, run(1, &path(&[0x8000_002C, 0x8000_06C1]), b"hello"));
        assert_ne!(a, run(0, &default_path(), b"hello"));
    }

    #[test]
    fn test_hmac_key_derivation() {
        let p = default_path();
        let sig = SoftKeys::new().sign(Curve::Ed25519, &p, &HMAC_KEY_SEED).unwrap();
        let key = Sha512::digest(sig.as_bytes());
        let mut mac = Hmac::<Sha256>::new_from_slice(&key).unwrap();
        mac.update(b"data");
        assert_eq!(run(0, &p, b"data"), mac.finalize().into_bytes().to_vec());
    }

    #[test]
    fn test_hmac_parameter_checks() {
        let mut keys = SoftKeys::new();
        let data = path_bytes(&default_path());
        assert_eq!(handler_hmac(&mut keys, 1, 0, &data).err(), Some(AppSW::WrongParam));
        let mut long = data.clone();
        long.resize(MAX_APDU_SIZE + 1, 0);
        assert_eq!(
            handler_hmac(&mut keys, 0, 0, &long).err(),
            Some(AppSW::WrongLengthForInstruction)
        );
    }
}
