//! Host-side doubles for the device collaborators, and byte builders for wire fixtures.

use alloc::vec::Vec;

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::baking::{NvramData, Storage};
use crate::crypto::{blake2b_256, KeyProvider, PublicKey, Signature};
use crate::utils::{Bip32Path, Curve};
use crate::AppSW;

/// Keys derived from a hash of curve and path.
///
/// secp256k1 is real and signs with RFC 6979 nonces. Ed25519 and secp256r1 are stand-ins with
/// the right shapes, deterministic but not verifiable.
#[derive(Default)]
pub struct SoftKeys {
    /// Every message handed to `sign`, in order.
    pub signed: Vec<(Curve, Bip32Path, Vec<u8>)>,
}

impl SoftKeys {
    pub fn new() -> Self {
        Self::default()
    }

    fn secret(curve: Curve, path: &Bip32Path) -> [u8; 32] {
        let mut seed = Vec::from([curve.code()]);
        for c in path.as_ref() {
            seed.extend_from_slice(&c.to_be_bytes());
        }
        blake2b_256(&seed)
    }

    fn tagged(secret: &[u8; 32], tag: &[u8]) -> [u8; 32] {
        let mut data = Vec::from(&secret[..]);
        data.extend_from_slice(tag);
        blake2b_256(&data)
    }

    pub fn key(&self, curve: Curve, path: &Bip32Path) -> PublicKey {
        let secret = Self::secret(curve, path);
        match curve {
            Curve::Ed25519 => PublicKey::from_ed25519(&Self::tagged(&secret, b"ed25519")),
            Curve::Secp256k1 => {
                let sk = SigningKey::from_slice(&secret).unwrap();
                let point = sk.verifying_key().to_encoded_point(false);
                let mut w = [0u8; 65];
                w.copy_from_slice(point.as_bytes());
                PublicKey::from_uncompressed(curve, &w)
            }
            Curve::Secp256r1 => {
                let mut w = [0u8; 65];
                w[0] = 0x04;
                w[1..33].copy_from_slice(&Self::tagged(&secret, b"x"));
                w[33..].copy_from_slice(&Self::tagged(&secret, b"y"));
                PublicKey::from_uncompressed(curve, &w)
            }
        }
    }
}

impl KeyProvider for SoftKeys {
    fn public_key(&mut self, curve: Curve, path: &Bip32Path) -> Result<PublicKey, AppSW> {
        Ok(self.key(curve, path))
    }

    fn sign(&mut self, curve: Curve, path: &Bip32Path, msg: &[u8]) -> Result<Signature, AppSW> {
        self.signed.push((curve, *path, msg.to_vec()));
        let secret = Self::secret(curve, path);
        match curve {
            Curve::Ed25519 => {
                let mut sig = [0u8; 64];
                sig[..32].copy_from_slice(&Self::tagged(&secret, msg));
                sig[32..].copy_from_slice(&blake2b_256(msg));
                Ok(Signature::ed25519(&sig))
            }
            Curve::Secp256k1 => {
                let sk = SigningKey::from_slice(&secret).unwrap();
                let (sig, recid) = sk
                    .sign_prehash_recoverable(msg)
                    .map_err(|_| AppSW::WrongLengthForInstruction)?;
                Signature::ecdsa(sig.to_der().as_bytes(), recid.is_y_odd())
            }
            Curve::Secp256r1 => {
                let mut r = Self::tagged(&secret, msg);
                let mut s = blake2b_256(msg);
                r[0] &= 0x7F;
                s[0] &= 0x7F;
                let mut der = Vec::from([0x30, 0x44, 0x02, 0x20]);
                der.extend_from_slice(&r);
                der.extend_from_slice(&[0x02, 0x20]);
                der.extend_from_slice(&s);
                Signature::ecdsa(&der, r[31] & 1 == 1)
            }
        }
    }
}

/// Checks a secp256k1 signature in the wire form, parity bit included.
pub fn verify_secp256k1(public_key: &[u8], digest: &[u8], sig: &[u8]) -> bool {
    let mut der = sig.to_vec();
    der[0] &= !0x01;
    let Ok(sig) = k256::ecdsa::Signature::from_der(&der) else {
        return false;
    };
    let Ok(vk) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    vk.verify_prehash(digest, &sig).is_ok()
}

/// In-memory [`Storage`] counting successful writes.
#[derive(Default)]
pub struct MemoryStorage {
    pub data: NvramData,
    pub writes: usize,
    /// Makes every `store` fail.
    pub broken: bool,
}

impl MemoryStorage {
    pub fn with(data: NvramData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> NvramData {
        self.data
    }

    fn store(&mut self, data: &NvramData) -> Result<(), AppSW> {
        if self.broken {
            return Err(AppSW::MemoryError);
        }
        self.data = *data;
        self.writes += 1;
        Ok(())
    }
}

pub mod fixtures {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::crypto::PublicKey;
    use crate::parser::michelson::IF_NONE_FAIL;
    use crate::types::SignatureType;
    use crate::utils::Bip32Path;

    const COUNTER: u64 = 2_019_617;
    const GAS_LIMIT: u64 = 10_300;

    pub fn path(components: &[u32]) -> Bip32Path {
        Bip32Path::new(components).unwrap()
    }

    /// `44'/1729'/0'/0'`
    pub fn default_path() -> Bip32Path {
        path(&[0x8000_002C, 0x8000_06C1, 0x8000_0000, 0x8000_0000])
    }

    pub fn path_bytes(p: &Bip32Path) -> Vec<u8> {
        let mut out = Vec::new();
        p.to_wire(&mut out);
        out
    }

    /// Unsigned base-128 varint.
    pub fn z(mut n: u64) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let b = (n & 0x7F) as u8;
            n >>= 7;
            if n == 0 {
                out.push(b);
                return out;
            }
            out.push(b | 0x80);
        }
    }

    /// Non-negative Micheline integer.
    pub fn micheline_nat(n: u64) -> Vec<u8> {
        let mut out = vec![(n & 0x3F) as u8];
        let mut rest = n >> 6;
        while rest != 0 {
            if let Some(last) = out.last_mut() {
                *last |= 0x80;
            }
            out.push((rest & 0x7F) as u8);
            rest >>= 7;
        }
        out
    }

    pub fn implicit_of(pk: &PublicKey) -> [u8; 21] {
        let mut out = [0u8; 21];
        out[0] = SignatureType::from(pk.curve()) as u8;
        out[1..].copy_from_slice(&pk.hash());
        out
    }

    /// `signature_type || hash[20]`
    pub fn key_hash(signature_type: SignatureType, hash: &[u8; 20]) -> [u8; 21] {
        let mut out = [0u8; 21];
        out[0] = signature_type as u8;
        out[1..].copy_from_slice(hash);
        out
    }

    pub fn implicit_contract(key_hash: &[u8; 21]) -> [u8; 22] {
        let mut out = [0u8; 22];
        out[1..].copy_from_slice(key_hash);
        out
    }

    pub fn originated_contract(hash: &[u8; 20]) -> [u8; 22] {
        let mut out = [0u8; 22];
        out[0] = 0x01;
        out[1..21].copy_from_slice(hash);
        out
    }

    fn manager_fields(out: &mut Vec<u8>, fee: u64, storage: u64) {
        out.extend(z(fee));
        out.extend(z(COUNTER));
        out.extend(z(GAS_LIMIT));
        out.extend(z(storage));
    }

    /// `0x03 || branch || operations`
    pub fn group(ops: &[Vec<u8>]) -> Vec<u8> {
        let mut out = vec![0x03];
        out.extend_from_slice(&[0xBB; 32]);
        for op in ops {
            out.extend_from_slice(op);
        }
        out
    }

    pub fn reveal(source: &[u8; 21], fee: u64, storage: u64, pk: &PublicKey) -> Vec<u8> {
        let mut out = vec![107];
        out.extend_from_slice(source);
        manager_fields(&mut out, fee, storage);
        out.push(SignatureType::from(pk.curve()) as u8);
        let (key, len) = pk.compressed();
        out.extend_from_slice(&key[..len]);
        out
    }

    pub fn transaction(
        source: &[u8; 21],
        fee: u64,
        storage: u64,
        amount: u64,
        destination: &[u8; 22],
        params: Option<&[u8]>,
    ) -> Vec<u8> {
        let mut out = vec![108];
        out.extend_from_slice(source);
        manager_fields(&mut out, fee, storage);
        out.extend(z(amount));
        out.extend_from_slice(destination);
        match params {
            Some(p) => {
                out.push(0xFF);
                out.extend_from_slice(p);
            }
            None => out.push(0x00),
        }
        out
    }

    /// Pre-Babylon transaction, whose source is a full contract.
    pub fn athens_transaction(
        source: &[u8; 22],
        fee: u64,
        storage: u64,
        amount: u64,
        destination: &[u8; 22],
    ) -> Vec<u8> {
        let mut out = vec![8];
        out.extend_from_slice(source);
        manager_fields(&mut out, fee, storage);
        out.extend(z(amount));
        out.extend_from_slice(destination);
        out.push(0x00);
        out
    }

    pub fn delegation(source: &[u8; 21], fee: u64, storage: u64, delegate: Option<&[u8; 21]>) -> Vec<u8> {
        let mut out = vec![110];
        out.extend_from_slice(source);
        manager_fields(&mut out, fee, storage);
        match delegate {
            Some(d) => {
                out.push(0xFF);
                out.extend_from_slice(d);
            }
            None => out.push(0x00),
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    pub fn origination(
        source: &[u8; 21],
        fee: u64,
        storage: u64,
        manager: &[u8; 21],
        balance: u64,
        spendable: bool,
        delegatable: bool,
        delegate: Option<&[u8; 21]>,
        script: bool,
    ) -> Vec<u8> {
        let mut out = vec![109];
        out.extend_from_slice(source);
        manager_fields(&mut out, fee, storage);
        out.extend_from_slice(manager);
        out.extend(z(balance));
        out.push(spendable as u8);
        out.push(delegatable as u8);
        match delegate {
            Some(d) => {
                out.push(0xFF);
                out.extend_from_slice(d);
            }
            None => out.push(0x00),
        }
        out.push(script as u8);
        out
    }

    pub fn proposal(source: &[u8; 21], period: i32, protocol: &[u8; 32]) -> Vec<u8> {
        let mut out = vec![5];
        out.extend_from_slice(source);
        out.extend_from_slice(&period.to_be_bytes());
        out.extend_from_slice(&32u32.to_be_bytes());
        out.extend_from_slice(protocol);
        out
    }

    pub fn ballot(source: &[u8; 21], period: i32, proposal: &[u8; 32], vote: u8) -> Vec<u8> {
        let mut out = vec![6];
        out.extend_from_slice(source);
        out.extend_from_slice(&period.to_be_bytes());
        out.extend_from_slice(proposal);
        out.push(vote);
        out
    }

    /// `0x02 || entrypoint length || script`
    pub fn manager_call(script: &[u8]) -> Vec<u8> {
        let mut out = vec![0x02];
        out.extend_from_slice(&(script.len() as u32).to_be_bytes());
        out.extend_from_slice(script);
        out
    }

    fn sequence(body: Vec<u8>) -> Vec<u8> {
        let mut out = vec![0x02];
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend(body);
        out
    }

    fn prologue() -> Vec<u8> {
        vec![0x03, 0x20, 0x05, 0x3d, 0x03, 0x6d]
    }

    fn bytes_literal(body: &mut Vec<u8>, data: &[u8]) {
        body.push(0x0a);
        body.extend_from_slice(&(data.len() as u32).to_be_bytes());
        body.extend_from_slice(data);
    }

    fn transfer_tail(body: &mut Vec<u8>, amount: u64) {
        body.extend_from_slice(&[0x07, 0x43, 0x03, 0x6a, 0x00]);
        body.extend(micheline_nat(amount));
        body.extend_from_slice(&[0x03, 0x4f, 0x03, 0x4d, 0x03, 0x1b]);
    }

    pub fn script_set_delegate(key_hash: &[u8; 21]) -> Vec<u8> {
        let mut body = prologue();
        body.extend_from_slice(&[0x07, 0x43, 0x03, 0x5d]);
        bytes_literal(&mut body, key_hash);
        body.extend_from_slice(&[0x03, 0x46, 0x03, 0x4e, 0x03, 0x1b]);
        sequence(body)
    }

    pub fn script_withdraw_delegate() -> Vec<u8> {
        let mut body = prologue();
        body.extend_from_slice(&[0x05, 0x3e, 0x03, 0x5d, 0x03, 0x4e, 0x03, 0x1b]);
        sequence(body)
    }

    pub fn script_transfer_to_implicit(key_hash: &[u8; 21], amount: u64) -> Vec<u8> {
        let mut body = prologue();
        body.extend_from_slice(&[0x07, 0x43, 0x03, 0x5d]);
        bytes_literal(&mut body, key_hash);
        body.extend_from_slice(&[0x03, 0x1e]);
        transfer_tail(&mut body, amount);
        sequence(body)
    }

    pub fn script_transfer_to_contract(hash: &[u8; 20], amount: u64) -> Vec<u8> {
        let mut body = prologue();
        body.extend_from_slice(&[0x07, 0x43, 0x03, 0x6e]);
        let mut address = vec![0x01];
        address.extend_from_slice(hash);
        address.push(0x00);
        bytes_literal(&mut body, &address);
        body.extend_from_slice(&[0x05, 0x55, 0x03, 0x6c]);
        body.extend_from_slice(&IF_NONE_FAIL);
        transfer_tail(&mut body, amount);
        sequence(body)
    }

    /// Block header prefix: magic, chain id, level, proto, then opaque bytes.
    pub fn block(chain_id: u32, level: u32) -> Vec<u8> {
        let mut out = vec![0x01];
        out.extend_from_slice(&chain_id.to_be_bytes());
        out.extend_from_slice(&level.to_be_bytes());
        out.push(0x05);
        out.extend_from_slice(&[0xCC; 40]);
        out
    }

    pub fn endorsement(chain_id: u32, level: u32) -> Vec<u8> {
        let mut out = vec![0x02];
        out.extend_from_slice(&chain_id.to_be_bytes());
        out.extend_from_slice(&[0xBB; 32]);
        out.push(0x00);
        out.extend_from_slice(&level.to_be_bytes());
        out
    }
}
