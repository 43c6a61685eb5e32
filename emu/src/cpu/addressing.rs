//! # Addressing Modes
//!
//! Every operand byte is interpreted through an addressing depth, i.e. the
//! number of memory lookups applied to the raw byte before it becomes a value.
//!
//! ```text
//! ┌────────┬────────┬──────────────────┬──────────────────────────────┐
//! │ Prefix │ Depth  │ Name             │ Value of operand `0C`        │
//! ├────────┼────────┼──────────────────┼──────────────────────────────┤
//! │  none  │   0    │ Immediate        │ 0x0C                         │
//! │   @    │   1    │ Indirect         │ memory[0x0C]                 │
//! │   *    │   2    │ Double indirect  │ memory[memory[0x0C]]         │
//! └────────┴────────┴──────────────────┴──────────────────────────────┘
//! ```
//!
//! Destinations are addresses, so they are always at least one level deep:
//! they use [`Indirection`] instead of [`AddressingDepth`].

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How many memory indirections are applied to an operand byte.
///
/// The ordering is meaningful: the assembler compares depths to put
/// commutative operands in canonical order (deepest first).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AddressingDepth {
    /// The raw byte is the value.
    #[default]
    Immediate = 0,

    /// The raw byte is the address of the value.
    Indirect = 1,

    /// The raw byte is the address of the address of the value.
    DoubleIndirect = 2,
}

impl AddressingDepth {
    pub const ALL: [Self; 3] = [Self::Immediate, Self::Indirect, Self::DoubleIndirect];

    /// Depth encoded by the first character of an operand token.
    #[must_use]
    pub fn from_prefix(token: &str) -> Self {
        match token.chars().next() {
            Some('@') => Self::Indirect,
            Some('*') => Self::DoubleIndirect,
            _ => Self::Immediate,
        }
    }

    #[must_use]
    pub const fn prefix(self) -> Option<char> {
        match self {
            Self::Immediate => None,
            Self::Indirect => Some('@'),
            Self::DoubleIndirect => Some('*'),
        }
    }
}

impl From<Indirection> for AddressingDepth {
    fn from(indirection: Indirection) -> Self {
        match indirection {
            Indirection::Single => Self::Indirect,
            Indirection::Double => Self::DoubleIndirect,
        }
    }
}

impl std::fmt::Display for AddressingDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Depth of an operand used as a memory address (a write destination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indirection {
    /// The raw byte is the address.
    Single,

    /// The raw byte is the address holding the address.
    Double,
}

impl Indirection {
    pub const ALL: [Self; 2] = [Self::Single, Self::Double];
}

impl TryFrom<AddressingDepth> for Indirection {
    type Error = Error;

    fn try_from(depth: AddressingDepth) -> Result<Self, Self::Error> {
        match depth {
            AddressingDepth::Immediate => Err(Error::ImmediateAddress),
            AddressingDepth::Indirect => Ok(Self::Single),
            AddressingDepth::DoubleIndirect => Ok(Self::Double),
        }
    }
}

impl std::fmt::Display for Indirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&AddressingDepth::from(*self), f)
    }
}
