//! # Assembler
//!
//! Source is a whitespace separated list of 3-character tokens, read in
//! groups of four. A group starting with a mnemonic becomes an instruction,
//! any other group is raw data (each token is one byte):
//!
//! ```text
//! MOV 001 @0C 000      ->  01 01 0C 01
//! ADD @0D *0F @0E      ->  4F 0F 0D 0E   (operands swapped, deepest first)
//! ADD 002 003 @10      ->  01 05 10 01   (folded into MOV 005 @10 001)
//! 000 000 000 00C      ->  00 00 00 0C
//! ```
//!
//! Assembly never fails on content: unknown tokens are 0 and operand
//! combinations without an opcode assemble to NOP. Only a token count that is
//! not a multiple of four is rejected.

mod mnemonic;
mod operand;

pub use mnemonic::Mnemonic;
pub use operand::{Operand, parse_value};

use crate::cpu::addressing::AddressingDepth;
use crate::cpu::instruction::SIZE_OF_INSTRUCTION;
use crate::error::{Error, Result};

/// A mnemonic and its operands, before opcode selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceInstruction {
    mnemonic: Mnemonic,
    operands: [Operand; 3],
}

impl SourceInstruction {
    /// Puts the deeper operand of a commutative pair first.
    fn canonicalize(mut self) -> Self {
        let [first, second, _] = self.operands;
        if self.mnemonic.is_commutative() && first.depth < second.depth {
            tracing::debug!("Swapping operands of {:?}", self.mnemonic);
            self.operands.swap(0, 1);
        }
        self
    }

    /// Arithmetic on two immediates is computed now and stored with a MOV.
    fn fold_constants(self) -> Self {
        let Some(operation) = self.mnemonic.arithmetic() else {
            return self;
        };
        let [left, right, destination] = self.operands;
        if left.depth != AddressingDepth::Immediate || right.depth != AddressingDepth::Immediate {
            return self;
        }

        let result = operation.apply(left.value, right.value);
        tracing::debug!(
            "Folding {:?} {:02X} {:02X} into {result:02X}",
            self.mnemonic,
            left.value,
            right.value
        );

        Self {
            mnemonic: Mnemonic::Mov,
            operands: [Operand::immediate(result), destination, Operand::immediate(1)],
        }
    }

    /// A literal zero length on MOV means one byte.
    fn default_length(mut self) -> Self {
        if self.mnemonic == Mnemonic::Mov && self.operands[2] == Operand::immediate(0) {
            self.operands[2] = Operand::immediate(1);
        }
        self
    }

    fn encode(self) -> [u8; SIZE_OF_INSTRUCTION] {
        let [p1, p2, p3] = self.operands;
        let opcode = self.mnemonic.opcode(p1.depth, p2.depth, p3.depth);

        [u8::from(opcode), p1.value, p2.value, p3.value]
    }
}

/// Assembles one group of four tokens.
#[must_use]
pub fn assemble_instruction(group: [&str; SIZE_OF_INSTRUCTION]) -> [u8; SIZE_OF_INSTRUCTION] {
    let [head, first, second, third] = group;

    let Ok(mnemonic) = head.parse::<Mnemonic>() else {
        tracing::debug!("Treating {group:?} as raw data");
        return group.map(parse_value);
    };

    SourceInstruction {
        mnemonic,
        operands: [first, second, third].map(Operand::from),
    }
    .canonicalize()
    .fold_constants()
    .default_length()
    .encode()
}

/// Assembles a token list into bytecode, four bytes per group of four tokens.
///
/// # Errors
///
/// The number of tokens must be a multiple of 4.
pub fn assemble_program<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<u8>> {
    if tokens.len() % SIZE_OF_INSTRUCTION != 0 {
        return Err(Error::TokenCount {
            count: tokens.len(),
        });
    }

    let mut bytecode = Vec::with_capacity(tokens.len());
    for group in tokens.chunks_exact(SIZE_OF_INSTRUCTION) {
        bytecode.extend(assemble_instruction([
            group[0].as_ref(),
            group[1].as_ref(),
            group[2].as_ref(),
            group[3].as_ref(),
        ]));
    }

    Ok(bytecode)
}

/// Splits source text on any whitespace.
#[must_use]
pub fn tokenize(source: &str) -> Vec<&str> {
    source.split_whitespace().collect()
}

/// # Errors
///
/// See [`assemble_program`].
pub fn assemble_source(source: &str) -> Result<Vec<u8>> {
    assemble_program(&tokenize(source))
}
