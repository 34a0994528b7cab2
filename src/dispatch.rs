//! Command dispatch.
//!
//! [`App`] owns the collaborators, the signing session and the action waiting on the user. A
//! frame goes in, and either a [`Response`] comes back or a [`Prompt`] that must be answered
//! through [`App::resume`] before anything is sent to the host.

use alloc::vec::Vec;

use crate::app_ui::Prompt;
use crate::baking::Storage;
use crate::config::{AppConfig, Mode, CLA};
use crate::crypto::KeyProvider;
use crate::handlers::baking::{
    commit_authorization, commit_reset, commit_setup, handler_deauthorize, handler_query_all_hwm,
    handler_query_auth_key, handler_query_auth_key_with_curve, handler_query_main_hwm,
    handler_reset, handler_setup,
};
use crate::handlers::get_public_key::{handler_authorize_baking, handler_get_public_key};
use crate::handlers::get_version::{handler_get_git, handler_get_version};
use crate::handlers::hmac::handler_hmac;
use crate::handlers::sign::{execute, handler_sign, SignKind, SignRequest};
use crate::handlers::{public_key_reply, Pending, SignContext, Step};
use crate::AppSW;

/// `cla ins p1 p2 lc`
const HEADER_SIZE: usize = 5;

/// A command as received from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame<'a> {
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn parse(raw: &'a [u8]) -> Result<Self, AppSW> {
        match raw.first() {
            Some(&CLA) => {}
            Some(_) => return Err(AppSW::ClassError),
            None => return Err(AppSW::WrongLength),
        }
        if raw.len() < HEADER_SIZE || raw[4] as usize != raw.len() - HEADER_SIZE {
            return Err(AppSW::WrongLength);
        }
        Ok(Frame {
            ins: raw[1],
            p1: raw[2],
            p2: raw[3],
            data: &raw[HEADER_SIZE..],
        })
    }
}

/// Possible input commands received through APDUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Version,
    AuthorizeBaking,
    GetPublicKey { display: bool },
    Sign(SignKind),
    Reset,
    QueryAuthKey,
    QueryMainHwm,
    Git,
    Setup,
    QueryAllHwm,
    Deauthorize,
    QueryAuthKeyWithCurve,
    Hmac,
}

impl Instruction {
    /// Looks `ins` up in the table of the build `mode`.
    pub fn decode(ins: u8, mode: Mode) -> Result<Self, AppSW> {
        let baking = mode == Mode::Baking;
        match ins {
            0x00 => Ok(Instruction::Version),
            0x01 if baking => Ok(Instruction::AuthorizeBaking),
            0x02 => Ok(Instruction::GetPublicKey { display: false }),
            0x03 => Ok(Instruction::GetPublicKey { display: true }),
            0x04 => Ok(Instruction::Sign(SignKind::Sign)),
            0x05 if !baking => Ok(Instruction::Sign(SignKind::SignUnsafe)),
            0x06 if baking => Ok(Instruction::Reset),
            0x07 if baking => Ok(Instruction::QueryAuthKey),
            0x08 if baking => Ok(Instruction::QueryMainHwm),
            0x09 => Ok(Instruction::Git),
            0x0A if baking => Ok(Instruction::Setup),
            0x0B if baking => Ok(Instruction::QueryAllHwm),
            0x0C if baking => Ok(Instruction::Deauthorize),
            0x0D if baking => Ok(Instruction::QueryAuthKeyWithCurve),
            0x0E if baking => Ok(Instruction::Hmac),
            0x0F => Ok(Instruction::Sign(SignKind::SignWithHash)),
            _ => Err(AppSW::InvalidInstruction),
        }
    }
}

/// Reply payload with its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub data: Vec<u8>,
    pub status: AppSW,
}

impl Response {
    pub fn ok(data: Vec<u8>) -> Self {
        Self {
            data,
            status: AppSW::Ok,
        }
    }

    /// Errors never carry a payload.
    pub fn error(status: AppSW) -> Self {
        Self {
            data: Vec::new(),
            status,
        }
    }

    pub fn status_word(&self) -> u16 {
        self.status.status_word()
    }

    /// `data || status word`, as sent on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() + 2);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.status_word().to_be_bytes());
        out
    }
}

#[derive(Debug)]
pub enum Outcome {
    Reply(Response),
    /// Show the prompt, then answer with [`App::resume`].
    Confirm(Prompt),
}

pub struct App<K: KeyProvider, S: Storage> {
    config: AppConfig,
    keys: K,
    storage: S,
    ctx: SignContext,
    pending: Option<Pending>,
}

impl<K: KeyProvider, S: Storage> App<K, S> {
    pub fn new(config: AppConfig, keys: K, storage: S) -> Self {
        Self {
            config,
            keys,
            storage,
            ctx: SignContext::new(),
            pending: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn keys(&self) -> &K {
        &self.keys
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether a prompt is waiting for [`App::resume`].
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle_frame(&mut self, raw: &[u8]) -> Outcome {
        if self.pending.take().is_some() {
            log::debug!("pending confirmation cancelled by a new command");
            self.ctx.reset();
        }

        match self.process(raw) {
            Ok(Step::Reply(data)) => Outcome::Reply(Response::ok(data)),
            Ok(Step::Confirm(prompt, pending)) => {
                self.pending = Some(pending);
                Outcome::Confirm(prompt)
            }
            Err(sw) => {
                self.ctx.reset();
                log::debug!("command failed: {:?} ({:?})", sw, sw.category());
                Outcome::Reply(Response::error(sw))
            }
        }
    }

    /// Answers the prompt returned by the last [`App::handle_frame`]. `None` when nothing is
    /// pending.
    pub fn resume(&mut self, approved: bool) -> Option<Response> {
        let pending = self.pending.take()?;
        let result = if approved {
            self.complete(pending)
        } else {
            log::info!("rejected by user");
            Err(AppSW::Rejected)
        };
        self.ctx.reset();

        Some(match result {
            Ok(data) => Response::ok(data),
            Err(sw) => Response::error(sw),
        })
    }

    fn process(&mut self, raw: &[u8]) -> Result<Step, AppSW> {
        let frame = Frame::parse(raw)?;
        let ins = Instruction::decode(frame.ins, self.config.mode)?;
        log::debug!(
            "{:?} p1={:#04x} p2={:#04x} lc={}",
            ins,
            frame.p1,
            frame.p2,
            frame.data.len()
        );

        if !matches!(ins, Instruction::Sign(_)) && self.ctx.is_started() {
            log::debug!("signing session abandoned");
            self.ctx.reset();
        }

        match ins {
            Instruction::Version => handler_get_version(&self.config),
            Instruction::Git => handler_get_git(&self.config),
            Instruction::GetPublicKey { display } => {
                handler_get_public_key(&mut self.keys, frame.p1, frame.p2, frame.data, display)
            }
            Instruction::AuthorizeBaking => {
                handler_authorize_baking(&mut self.keys, frame.p1, frame.p2, frame.data)
            }
            Instruction::Sign(kind) => handler_sign(
                &mut self.ctx,
                &mut self.keys,
                &mut self.storage,
                self.config.mode,
                SignRequest {
                    kind,
                    p1: frame.p1,
                    p2: frame.p2,
                    data: frame.data,
                },
            ),
            Instruction::Reset => handler_reset(frame.data),
            Instruction::Setup => handler_setup(&mut self.keys, frame.p1, frame.p2, frame.data),
            Instruction::Deauthorize => handler_deauthorize(&mut self.storage, frame.p1, frame.data),
            Instruction::QueryAuthKey => handler_query_auth_key(&self.storage),
            Instruction::QueryAuthKeyWithCurve => handler_query_auth_key_with_curve(&self.storage),
            Instruction::QueryMainHwm => handler_query_main_hwm(&self.storage),
            Instruction::QueryAllHwm => handler_query_all_hwm(&self.storage),
            Instruction::Hmac => handler_hmac(&mut self.keys, frame.p1, frame.p2, frame.data),
        }
    }

    fn complete(&mut self, pending: Pending) -> Result<Vec<u8>, AppSW> {
        match pending {
            Pending::Sign(plan) => execute(&mut self.keys, &plan),
            Pending::ProvidePublicKey(public_key) => Ok(public_key_reply(&public_key)),
            Pending::AuthorizeBaking { key, public_key } => {
                commit_authorization(&mut self.storage, key)?;
                Ok(public_key_reply(&public_key))
            }
            Pending::Setup {
                key,
                public_key,
                main_chain_id,
                main_level,
                test_level,
            } => {
                commit_setup(&mut self.storage, key, main_chain_id, main_level, test_level)?;
                Ok(public_key_reply(&public_key))
            }
            Pending::Reset(level) => {
                commit_reset(&mut self.storage, level)?;
                Ok(Vec::new())
            }
        }
    }
}
