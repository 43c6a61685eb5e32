use thiserror::Error;

/// Caller mistakes detected at the crate boundary.
///
/// Running programs never fails: bad operands, undefined opcodes and
/// divisions by zero all degrade to zero or NOP. Only setting up the machine
/// with inconsistent inputs is reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("source has {count} tokens, expected a multiple of 4")]
    TokenCount { count: usize },

    #[error("invalid memory size {size}, expected a positive multiple of 4")]
    InvalidMemorySize { size: usize },

    #[error("program is {size} bytes but memory holds only {capacity}")]
    ProgramTooLarge { size: usize, capacity: usize },

    #[error("an immediate operand is not an address")]
    ImmediateAddress,

    #[error("unknown mnemonic {mnemonic:?}")]
    UnknownMnemonic { mnemonic: String },
}

pub type Result<T> = std::result::Result<T, Error>;
