//! # Memory
//!
//! A single byte-addressed space shared by code and data. It behaves as a
//! ring: every address is reduced modulo the memory size, so there is no
//! such thing as an out-of-range access.
//!
//! ```text
//!  size = 16
//!  ┌────┬────┬────┬────┬─────┬────┐
//!  │ 00 │ 01 │ 02 │ 03 │ ... │ 0F │──┐
//!  └────┴────┴────┴────┴─────┴────┘  │  address 0x10 is 0x00 again
//!    ▲                               │
//!    └───────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use super::addressing::{AddressingDepth, Indirection};
use super::instruction::SIZE_OF_INSTRUCTION;
use crate::error::Error;

/// Memory size used when none is given: everything an 8-bit operand can reach.
pub const DEFAULT_MEMORY_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Memory(Vec<u8>);

impl Default for Memory {
    fn default() -> Self {
        Self(vec![0; DEFAULT_MEMORY_SIZE])
    }
}

impl TryFrom<Vec<u8>> for Memory {
    type Error = Error;

    /// Takes `bytes` as the whole memory, its length must be a valid size.
    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        check_size(bytes.len())?;
        Ok(Self(bytes))
    }
}

impl From<Memory> for Vec<u8> {
    fn from(memory: Memory) -> Self {
        memory.0
    }
}

const fn check_size(size: usize) -> Result<(), Error> {
    if size == 0 || size % SIZE_OF_INSTRUCTION != 0 {
        return Err(Error::InvalidMemorySize { size });
    }
    Ok(())
}

impl Memory {
    /// Zeroed memory of `size` bytes.
    ///
    /// # Errors
    ///
    /// `size` must be a positive multiple of the instruction size (4).
    pub fn new(size: usize) -> Result<Self, Error> {
        check_size(size)?;
        Ok(Self(vec![0; size]))
    }

    /// Memory of `size` bytes with `program` copied at address 0.
    ///
    /// # Errors
    ///
    /// Fails on an invalid `size` or when `program` does not fit.
    pub fn with_program(size: usize, program: &[u8]) -> Result<Self, Error> {
        let mut memory = Self::new(size)?;
        memory.load(program)?;
        Ok(memory)
    }

    /// Copies `program` at address 0, leaving the rest of memory untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProgramTooLarge`] when `program` is longer than memory.
    pub fn load(&mut self, program: &[u8]) -> Result<(), Error> {
        if program.len() > self.0.len() {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
                capacity: self.0.len(),
            });
        }

        self.0[..program.len()].copy_from_slice(program);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, memory has at least one instruction worth of bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Reduces `address` into `[0, len)`.
    #[must_use]
    pub fn wrap(&self, address: usize) -> usize {
        address % self.0.len()
    }

    #[must_use]
    pub fn read(&self, address: usize) -> u8 {
        self.0[self.wrap(address)]
    }

    pub fn write(&mut self, address: usize, value: u8) {
        let address = self.wrap(address);
        self.0[address] = value;
    }

    /// Resolves an operand byte to the value it designates.
    #[must_use]
    pub fn value(&self, raw: u8, depth: AddressingDepth) -> u8 {
        match depth {
            AddressingDepth::Immediate => raw,
            AddressingDepth::Indirect => self.read(raw.into()),
            AddressingDepth::DoubleIndirect => self.read(self.read(raw.into()).into()),
        }
    }

    /// Resolves an operand byte to the (wrapped) address it designates.
    #[must_use]
    pub fn address(&self, raw: u8, indirection: Indirection) -> usize {
        match indirection {
            Indirection::Single => self.wrap(raw.into()),
            Indirection::Double => self.wrap(self.read(raw.into()).into()),
        }
    }
}

impl std::fmt::Display for Memory {
    /// One instruction per line, as uppercase hex: `01010C01`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.0.chunks(SIZE_OF_INSTRUCTION) {
            for byte in row {
                write!(f, "{byte:02X}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
