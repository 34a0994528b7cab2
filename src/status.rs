/// Application status words.
///
/// Every fallible path in the app returns one of these and the dispatcher turns it into the
/// two trailing bytes of the response, exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppSW {
    Ok,
    WrongParam,
    WrongLength,
    InvalidInstruction,
    WrongLengthForInstruction,
    Rejected,
    ParseError,
    ReferencedDataNotFound,
    WrongValues,
    Security,
    HidRequired,
    ClassError,
    MemoryError,
    /// Primitive-specific failure code, folded into the generic range on the wire.
    Internal(u16),
}

/// Coarse grouping of failures, used when logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    None,
    Framing,
    Parse,
    Authorization,
    UserRejection,
    Resource,
    Device,
}

impl AppSW {
    /// Raw code before range folding.
    pub const fn code(self) -> u16 {
        match self {
            AppSW::Ok => 0x9000,
            AppSW::WrongParam => 0x6B00,
            AppSW::WrongLength => 0x6C00,
            AppSW::InvalidInstruction => 0x6D00,
            AppSW::WrongLengthForInstruction => 0x917E,
            AppSW::Rejected => 0x6985,
            AppSW::ParseError => 0x9405,
            AppSW::ReferencedDataNotFound => 0x6A88,
            AppSW::WrongValues => 0x6A80,
            AppSW::Security => 0x6982,
            AppSW::HidRequired => 0x6983,
            AppSW::ClassError => 0x6E00,
            AppSW::MemoryError => 0x9200,
            AppSW::Internal(code) => code,
        }
    }

    /// Status word as sent to the host.
    ///
    /// Codes in `0x6000..=0x6FFF` and `0x9000..=0x9FFF` pass through. Anything else lands in
    /// `0x68xx` with its low 11 bits kept for diagnostics.
    pub const fn status_word(self) -> u16 {
        let code = self.code();
        match code & 0xF000 {
            0x6000 | 0x9000 => code,
            _ => 0x6800 | (code & 0x07FF),
        }
    }

    pub const fn category(self) -> ErrorCategory {
        match self {
            AppSW::Ok => ErrorCategory::None,
            AppSW::ClassError
            | AppSW::WrongLength
            | AppSW::InvalidInstruction
            | AppSW::WrongParam
            | AppSW::WrongLengthForInstruction => ErrorCategory::Framing,
            AppSW::ParseError | AppSW::ReferencedDataNotFound => ErrorCategory::Parse,
            AppSW::Security | AppSW::WrongValues => ErrorCategory::Authorization,
            AppSW::Rejected => ErrorCategory::UserRejection,
            AppSW::MemoryError => ErrorCategory::Resource,
            AppSW::HidRequired | AppSW::Internal(_) => ErrorCategory::Device,
        }
    }
}
