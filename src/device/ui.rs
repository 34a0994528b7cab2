use alloc::vec::Vec;

use include_gif::include_gif;
use ledger_device_sdk::nbgl::{
    Field, NbglAddressReview, NbglGlyph, NbglHomeAndSettings, NbglReview, NbglReviewStatus,
    StatusType,
};

use ledger_tezos::app_ui::{Prompt, PromptKind};

#[cfg(any(target_os = "stax", target_os = "flex"))]
const TEZOS: NbglGlyph = NbglGlyph::from_include(include_gif!("tezos_64x64.gif", NBGL));
#[cfg(any(target_os = "nanosplus", target_os = "nanox"))]
const TEZOS: NbglGlyph = NbglGlyph::from_include(include_gif!("tezos_14x14.gif", NBGL));

#[cfg(feature = "baking")]
const APP_NAME: &str = "Tezos Baking";
#[cfg(not(feature = "baking"))]
const APP_NAME: &str = "Tezos Wallet";

pub fn ui_menu_main() -> NbglHomeAndSettings {
    NbglHomeAndSettings::new().glyph(&TEZOS).infos(
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
    )
}

/// Renders `prompt` and returns whether the user approved it.
pub fn ui_review(prompt: &Prompt) -> bool {
    if prompt.kind == PromptKind::Address {
        if let [field] = prompt.fields.as_slice() {
            return NbglAddressReview::new()
                .glyph(&TEZOS)
                .verify_str(&prompt.title)
                .show(&field.value);
        }
    }

    let fields: Vec<Field> = prompt
        .fields
        .iter()
        .map(|f| Field {
            name: f.name.as_str(),
            value: f.value.as_str(),
        })
        .collect();

    NbglReview::new()
        .glyph(&TEZOS)
        .titles(&prompt.title, "", &prompt.confirm)
        .show(&fields)
}

pub fn ui_status(kind: PromptKind, ok: bool) {
    let ty = match kind {
        PromptKind::Operation => StatusType::Transaction,
        PromptKind::Address => StatusType::Address,
        PromptKind::Settings => StatusType::Operation,
    };
    NbglReviewStatus::new().status_type(ty).show(ok);
}
