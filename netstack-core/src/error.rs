use thiserror::Error;

/// Errors that can cross an API boundary in the engine.
///
/// Most failure modes described by the engine (malformed segment, misrouted
/// frame, ackno out of range, ...) are absorbed locally as silent drops or
/// sticky stream errors rather than surfaced here — see the decode path in
/// [`crate::wire`] for the one place a caller actually receives an `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("buffer too short: need at least {need} bytes, got {got}")]
    TooShort { need: usize, got: usize },

    #[error("header checksum mismatch")]
    BadChecksum,

    #[error("unsupported ARP opcode: {0}")]
    UnknownArpOpcode(u16),

    #[error("unsupported IP version: {0}")]
    BadIpVersion(u8),
}

pub type Result<T> = std::result::Result<T, EngineError>;
