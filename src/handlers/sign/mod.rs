//! Chunked signing: reassembly, classification and the decision to sign, prompt or refuse.

use alloc::vec::Vec;

use zeroize::Zeroizing;

mod buffer;
mod context;

pub use buffer::MessageBuffer;
pub use context::SignContext;

use super::{Pending, Step};
use crate::app_ui::sign::{blind_prompt, operation_prompt, prehashed_prompt, register_delegate_prompt};
use crate::baking::{authorize_and_commit, classify, MessageClass, Storage};
use crate::config::{Mode, MAX_APDU_SIZE};
use crate::crypto::{KeyProvider, HASH_SIZE};
use crate::parser::{parse_operations, MAGIC_OPERATION};
use crate::types::{AllowedOperations, OperationGroup, OperationKind, OperationType};
use crate::utils::{Bip32Path, Curve};
use crate::AppSW;

const P1_FIRST: u8 = 0x00;
const P1_NEXT: u8 = 0x01;
const P1_HASH_ONLY_NEXT: u8 = 0x03;
const P1_LAST_MARKER: u8 = 0x80;

/// Operations a baker may sign outside of consensus.
const BAKING_OPERATIONS: AllowedOperations = AllowedOperations::none()
    .with(OperationType::Reveal)
    .with(OperationType::Delegation);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignKind {
    /// Sign the Blake2b-256 digest of the message.
    Sign,
    /// Sign the message bytes as they are.
    SignUnsafe,
    /// As [`SignKind::Sign`], replying with the digest ahead of the signature.
    SignWithHash,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignPayload {
    Digest([u8; HASH_SIZE]),
    /// Wiped once the plan is dropped.
    Raw(Zeroizing<Vec<u8>>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyForm {
    Signature,
    HashAndSignature,
    HashOnly,
}

/// Everything needed to produce the reply once signing is allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignPlan {
    pub curve: Curve,
    pub path: Bip32Path,
    pub payload: SignPayload,
    pub reply: ReplyForm,
}

/// One signing command.
pub struct SignRequest<'a> {
    pub kind: SignKind,
    pub p1: u8,
    pub p2: u8,
    pub data: &'a [u8],
}

pub fn handler_sign<K: KeyProvider, S: Storage>(
    ctx: &mut SignContext,
    keys: &mut K,
    storage: &mut S,
    mode: Mode,
    req: SignRequest<'_>,
) -> Result<Step, AppSW> {
    if req.data.len() > MAX_APDU_SIZE {
        return Err(AppSW::WrongLengthForInstruction);
    }

    let last = req.p1 & P1_LAST_MARKER != 0;
    match req.p1 & !P1_LAST_MARKER {
        P1_FIRST => {
            ctx.reset();
            let (path, _) = Bip32Path::read(req.data)?;
            ctx.key = Some((Curve::try_from(req.p2)?, path));
            return Ok(Step::Reply(Vec::new()));
        }
        P1_HASH_ONLY_NEXT if mode == Mode::Wallet && req.kind != SignKind::SignUnsafe => {
            ctx.hash_only = true;
        }
        P1_NEXT => {}
        _ => return Err(AppSW::WrongParam),
    }

    if !ctx.is_started() {
        return Err(AppSW::WrongLengthForInstruction);
    }

    let streaming = mode == Mode::Wallet && req.kind != SignKind::SignUnsafe;
    ctx.buffer.append(req.data, streaming)?;

    if !last {
        return Ok(Step::Reply(Vec::new()));
    }

    let result = match mode {
        Mode::Baking => complete_baking(ctx, keys, storage, req.kind),
        Mode::Wallet => complete_wallet(ctx, keys, req.kind),
    };
    ctx.reset();
    result
}

fn reply_form(ctx: &SignContext, kind: SignKind) -> ReplyForm {
    if ctx.hash_only {
        ReplyForm::HashOnly
    } else if kind == SignKind::SignWithHash {
        ReplyForm::HashAndSignature
    } else {
        ReplyForm::Signature
    }
}

fn is_self_delegation(ops: &OperationGroup) -> bool {
    ops.operation.source == ops.signing
        && ops.operation.kind
            == OperationKind::Delegation {
                delegate: Some(ops.signing),
            }
}

fn complete_baking<K: KeyProvider, S: Storage>(
    ctx: &SignContext,
    keys: &mut K,
    storage: &mut S,
    kind: SignKind,
) -> Result<Step, AppSW> {
    let (curve, path) = ctx.key.ok_or(AppSW::WrongLengthForInstruction)?;
    let message = ctx.buffer.message().ok_or(AppSW::ParseError)?;
    let plan = SignPlan {
        curve,
        path,
        payload: SignPayload::Digest(ctx.buffer.digest()),
        reply: reply_form(ctx, kind),
    };

    match classify(message) {
        MessageClass::Block(data) | MessageClass::Endorsement(data) => {
            authorize_and_commit(storage, curve, &path, &data)?;
            Ok(Step::Reply(execute(keys, &plan)?))
        }
        MessageClass::Generic if message.first() == Some(&MAGIC_OPERATION) => {
            let public_key = keys.public_key(curve, &path)?;
            let ops = parse_operations(message, &public_key, BAKING_OPERATIONS).ok();
            let authorized = storage.load().checked().is_path_authorized(curve, &path);
            match ops {
                Some(ops) if authorized && is_self_delegation(&ops) => Ok(Step::Confirm(
                    register_delegate_prompt(&ops),
                    Pending::Sign(plan),
                )),
                _ => {
                    log::warn!("refusing operation that is not a self delegation by the baking key");
                    Err(AppSW::Security)
                }
            }
        }
        MessageClass::Generic => Err(AppSW::ParseError),
    }
}

fn complete_wallet<K: KeyProvider>(
    ctx: &SignContext,
    keys: &mut K,
    kind: SignKind,
) -> Result<Step, AppSW> {
    let (curve, path) = ctx.key.ok_or(AppSW::WrongLengthForInstruction)?;

    if kind == SignKind::SignUnsafe {
        let message = ctx.buffer.message().ok_or(AppSW::ParseError)?;
        if curve != Curve::Ed25519 && message.len() != HASH_SIZE {
            return Err(AppSW::WrongLengthForInstruction);
        }
        return Ok(Step::Confirm(
            prehashed_prompt(message),
            Pending::Sign(SignPlan {
                curve,
                path,
                payload: SignPayload::Raw(Zeroizing::new(message.to_vec())),
                reply: ReplyForm::Signature,
            }),
        ));
    }

    let digest = ctx.buffer.digest();
    let prompt = match ctx.buffer.first_byte() {
        Some(MAGIC_OPERATION) => {
            let parsed = match ctx.buffer.message() {
                Some(message) => {
                    let public_key = keys.public_key(curve, &path)?;
                    parse_operations(message, &public_key, AllowedOperations::all()).ok()
                }
                None => {
                    log::debug!("{} byte operation too long to decode", ctx.buffer.total_len());
                    None
                }
            };
            match parsed.as_ref().and_then(operation_prompt) {
                Some(prompt) => prompt,
                None => {
                    log::debug!("no detailed review for this operation, reviewing its hash");
                    blind_prompt(&digest)
                }
            }
        }
        // Consensus messages are for the baking app.
        _ => return Err(AppSW::ParseError),
    };

    Ok(Step::Confirm(
        prompt,
        Pending::Sign(SignPlan {
            curve,
            path,
            payload: SignPayload::Digest(digest),
            reply: reply_form(ctx, kind),
        }),
    ))
}

/// Produces the reply for an allowed signing request.
pub fn execute<K: KeyProvider>(keys: &mut K, plan: &SignPlan) -> Result<Vec<u8>, AppSW> {
    let (message, digest): (&[u8], Option<&[u8; HASH_SIZE]>) = match &plan.payload {
        SignPayload::Digest(d) => (d, Some(d)),
        SignPayload::Raw(m) => (m.as_slice(), None),
    };

    let mut out = Vec::new();
    match (plan.reply, digest) {
        (ReplyForm::HashOnly, Some(d)) => {
            out.extend_from_slice(d);
            return Ok(out);
        }
        (ReplyForm::HashAndSignature, Some(d)) => out.extend_from_slice(d),
        (ReplyForm::Signature, _) => {}
        (_, None) => return Err(AppSW::WrongValues),
    }

    if let Some(d) = digest {
        log::debug!("signing digest {}", hex::encode(d));
    }
    let signature = keys.sign(plan.curve, &plan.path, message)?;
    out.extend_from_slice(signature.as_bytes());
    Ok(out)
}
