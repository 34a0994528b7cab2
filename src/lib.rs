//! Tezos wallet and baking signer.
//!
//! Everything that decides whether a message may be signed lives here and runs without the
//! device SDK. The binary in `main.rs` supplies keys, storage and screens.

#![cfg_attr(not(test), no_std)]

// Required for using String, Vec, format!...
extern crate alloc;

pub mod app_ui;
pub mod baking;
pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod handlers;
pub mod parser;
pub mod status;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{App, Outcome, Response};
pub use status::AppSW;
