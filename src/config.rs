//! Build-time knobs and protocol constants.

/// Class byte expected on every command.
pub const CLA: u8 = 0x80;

/// Largest payload accepted for a single signing chunk.
pub const MAX_APDU_SIZE: usize = 230;

/// Capacity of the resident message buffer of a signing session.
pub const MESSAGE_CAPACITY: usize = 512;

/// Longest derivation path accepted.
pub const MAX_BIP32_LEN: usize = 10;

/// Blake2b compression block size.
pub const BLAKE2B_BLOCK: usize = 128;

/// Which of the two applications this build is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Consensus signing: blocks and endorsements guarded by the high-water mark.
    Baking,
    /// Interactive signing of user operations.
    Wallet,
}

impl Mode {
    /// Class byte reported by the version command.
    pub const fn class(self) -> u8 {
        match self {
            Mode::Baking => 1,
            Mode::Wallet => 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AppConfig {
    pub mode: Mode,
    pub version: (u8, u8, u8),
    pub git_commit: &'static str,
}

impl AppConfig {
    /// Configuration of the running binary, derived from cargo features and package metadata.
    pub fn from_build() -> Self {
        Self {
            mode: if cfg!(feature = "baking") {
                Mode::Baking
            } else {
                Mode::Wallet
            },
            version: package_version(),
            git_commit: match option_env!("GIT_COMMIT") {
                Some(commit) => commit,
                None => "unknown",
            },
        }
    }

    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::from_build()
        }
    }
}

fn package_version() -> (u8, u8, u8) {
    (
        parse_component(env!("CARGO_PKG_VERSION_MAJOR")),
        parse_component(env!("CARGO_PKG_VERSION_MINOR")),
        parse_component(env!("CARGO_PKG_VERSION_PATCH")),
    )
}

fn parse_component(s: &str) -> u8 {
    s.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_package() {
        let cfg = AppConfig::for_mode(Mode::Wallet);
        assert_eq!(cfg.version, (2, 2, 1));
        assert_eq!(cfg.mode.class(), 0);
        assert_eq!(Mode::Baking.class(), 1);
    }
}
