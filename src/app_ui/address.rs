use alloc::string::String;

use super::format::chain_id_to_string;
use super::{Prompt, PromptKind};
use crate::utils::number_to_string;

/// Shows the address of a key before handing the key to the host.
pub fn public_key_prompt(address: String) -> Prompt {
    Prompt::new(PromptKind::Address, "Provide Public Key", "Approve")
        .field("Public Key Hash", address)
}

pub fn authorize_baking_prompt(address: String) -> Prompt {
    Prompt::new(PromptKind::Address, "Authorize Baking With Public Key?", "Authorize")
        .field("Public Key Hash", address)
}

pub fn setup_prompt(address: String, main_chain_id: u32, main_level: u32, test_level: u32) -> Prompt {
    Prompt::new(PromptKind::Settings, "Setup Baking?", "Accept")
        .field("Address", address)
        .field("Chain", chain_id_to_string(main_chain_id))
        .field("Main Chain HWM", number_to_string(main_level.into()))
        .field("Test Chain HWM", number_to_string(test_level.into()))
}

pub fn reset_prompt(level: u32) -> Prompt {
    Prompt::new(PromptKind::Settings, "Reset HWM", "Reset").field("Level", number_to_string(level.into()))
}
