use alloc::vec::Vec;

use crate::app_ui::Prompt;
use crate::baking::BakingKey;
use crate::crypto::PublicKey;

pub mod baking;
pub mod get_public_key;
pub mod get_version;
pub mod hmac;
pub mod sign;

pub use sign::{SignContext, SignPlan};

/// What a handler produced for the current command.
#[derive(Debug)]
pub enum Step {
    /// Payload of a successful reply.
    Reply(Vec<u8>),
    /// Nothing is answered until the user has reviewed the prompt.
    Confirm(Prompt, Pending),
}

/// Work deferred until the user approves a prompt.
#[derive(Debug)]
pub enum Pending {
    Sign(SignPlan),
    ProvidePublicKey(PublicKey),
    AuthorizeBaking {
        key: BakingKey,
        public_key: PublicKey,
    },
    Setup {
        key: BakingKey,
        public_key: PublicKey,
        main_chain_id: u32,
        main_level: u32,
        test_level: u32,
    },
    Reset(u32),
}

/// `len || key` as returned to the host.
pub fn public_key_reply(public_key: &PublicKey) -> Vec<u8> {
    let bytes = public_key.as_bytes();
    let mut out = Vec::with_capacity(1 + bytes.len());
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
    out
}
