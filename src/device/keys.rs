use ledger_device_sdk::ecc::{CxError, Ed25519, Secp256k1, Secp256r1, SeedDerive};
use ledger_secure_sdk_sys::CX_ECCINFO_PARITY_ODD;

use ledger_tezos::crypto::{KeyProvider, PublicKey, Signature};
use ledger_tezos::utils::{Bip32Path, Curve};
use ledger_tezos::AppSW;

/// Keys derived from the device seed. Private keys are wiped by the SDK when dropped, so
/// none outlives the call that derived it.
pub struct DeviceKeys;

fn cx_error(err: CxError) -> AppSW {
    AppSW::Internal(err as u16)
}

fn ecdsa(result: Result<([u8; 72], u32, u32), CxError>) -> Result<Signature, AppSW> {
    let (der, len, info) = result.map_err(cx_error)?;
    let der = der.get(..len as usize).ok_or(AppSW::WrongLength)?;
    Signature::ecdsa(der, info & CX_ECCINFO_PARITY_ODD != 0)
}

impl KeyProvider for DeviceKeys {
    fn public_key(&mut self, curve: Curve, path: &Bip32Path) -> Result<PublicKey, AppSW> {
        let path = path.as_ref();
        let w = match curve {
            Curve::Ed25519 => Ed25519::derive_from_path_slip10(path)
                .public_key()
                .map(|pk| pk.pubkey),
            Curve::Secp256k1 => Secp256k1::derive_from_path(path)
                .public_key()
                .map(|pk| pk.pubkey),
            Curve::Secp256r1 => Secp256r1::derive_from_path(path)
                .public_key()
                .map(|pk| pk.pubkey),
        }
        .map_err(cx_error)?;
        Ok(PublicKey::from_uncompressed(curve, &w))
    }

    fn sign(&mut self, curve: Curve, path: &Bip32Path, msg: &[u8]) -> Result<Signature, AppSW> {
        let path = path.as_ref();
        match curve {
            Curve::Ed25519 => {
                let (sig, _) = Ed25519::derive_from_path_slip10(path)
                    .sign(msg)
                    .map_err(cx_error)?;
                Ok(Signature::ed25519(&sig))
            }
            Curve::Secp256k1 => ecdsa(Secp256k1::derive_from_path(path).deterministic_sign(msg)),
            Curve::Secp256r1 => ecdsa(Secp256r1::derive_from_path(path).deterministic_sign(msg)),
        }
    }
}
