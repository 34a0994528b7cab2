use alloc::string::String;

use super::{public_key_reply, Pending, Step};
use crate::app_ui::address::{authorize_baking_prompt, public_key_prompt};
use crate::app_ui::format::contract_to_string;
use crate::baking::BakingKey;
use crate::crypto::{KeyProvider, PublicKey};
use crate::types::Contract;
use crate::utils::{Bip32Path, Curve};
use crate::AppSW;

/// tz1/tz2/tz3 address of `public_key`.
pub fn public_key_hash_string(public_key: &PublicKey) -> String {
    contract_to_string(&Contract::Implicit {
        signature_type: public_key.curve().into(),
        hash: public_key.hash(),
    })
}

fn derive<K: KeyProvider>(
    keys: &mut K,
    p1: u8,
    p2: u8,
    data: &[u8],
) -> Result<(Curve, Bip32Path, PublicKey), AppSW> {
    if p1 != 0 {
        return Err(AppSW::WrongParam);
    }
    let curve = Curve::try_from(p2)?;
    let (path, _) = Bip32Path::read(data)?;
    let public_key = keys.public_key(curve, &path)?;
    Ok((curve, path, public_key))
}

/// Returns the key for `P2` curve and the path in the payload, after review when `display`.
pub fn handler_get_public_key<K: KeyProvider>(
    keys: &mut K,
    p1: u8,
    p2: u8,
    data: &[u8],
    display: bool,
) -> Result<Step, AppSW> {
    let (_, _, public_key) = derive(keys, p1, p2, data)?;

    if display {
        Ok(Step::Confirm(
            public_key_prompt(public_key_hash_string(&public_key)),
            Pending::ProvidePublicKey(public_key),
        ))
    } else {
        Ok(Step::Reply(public_key_reply(&public_key)))
    }
}

/// Makes the key the baking key once the user approves, then returns it.
pub fn handler_authorize_baking<K: KeyProvider>(
    keys: &mut K,
    p1: u8,
    p2: u8,
    data: &[u8],
) -> Result<Step, AppSW> {
    let (curve, path, public_key) = derive(keys, p1, p2, data)?;
    Ok(Step::Confirm(
        authorize_baking_prompt(public_key_hash_string(&public_key)),
        Pending::AuthorizeBaking {
            key: BakingKey { curve, path },
            public_key,
        },
    ))
}
