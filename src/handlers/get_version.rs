use alloc::vec;
use alloc::vec::Vec;

use super::Step;
use crate::config::AppConfig;
use crate::AppSW;

/// `class || major || minor || patch`, class 1 for the baking build.
pub fn handler_get_version(config: &AppConfig) -> Result<Step, AppSW> {
    let (major, minor, patch) = config.version;
    Ok(Step::Reply(vec![config.mode.class(), major, minor, patch]))
}

/// Commit the binary was built from, NUL terminated.
pub fn handler_get_git(config: &AppConfig) -> Result<Step, AppSW> {
    let mut out = Vec::with_capacity(config.git_commit.len() + 1);
    out.extend_from_slice(config.git_commit.as_bytes());
    out.push(0);
    Ok(Step::Reply(out))
}
