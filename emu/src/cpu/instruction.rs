use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::addressing::AddressingDepth;
use super::opcode::Opcode;

/// Every instruction is exactly one opcode byte followed by three operand bytes.
pub const SIZE_OF_INSTRUCTION: usize = 4;

/// Four bytes fetched at the program counter, with the opcode decoded.
///
/// Instructions are decoded again on every step, code may have rewritten
/// itself in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,

    /// The opcode byte as found in memory.
    pub raw: u8,

    pub p1: u8,
    pub p2: u8,
    pub p3: u8,
}

impl From<[u8; SIZE_OF_INSTRUCTION]> for Instruction {
    fn from([raw, p1, p2, p3]: [u8; SIZE_OF_INSTRUCTION]) -> Self {
        Self {
            opcode: Opcode::from(raw),
            raw,
            p1,
            p2,
            p3,
        }
    }
}

impl Instruction {
    #[must_use]
    pub const fn bytes(&self) -> [u8; SIZE_OF_INSTRUCTION] {
        [self.raw, self.p1, self.p2, self.p3]
    }
}

/// Renders an operand back to its 3-character source token.
fn token(value: u8, depth: AddressingDepth) -> String {
    match depth.prefix() {
        Some(prefix) => format!("{prefix}{value:02X}"),
        None => format!("{value:03X}"),
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Some(mnemonic) = self.opcode.mnemonic() else {
            // Not an instruction: show the bytes as a data line.
            let [raw, p1, p2, p3] = self.bytes();
            return write!(f, "{raw:03X} {p1:03X} {p2:03X} {p3:03X}");
        };

        let [d1, d2, d3] = self.opcode.operand_depths();
        write!(
            f,
            "{mnemonic} {} {} {}",
            token(self.p1, d1),
            token(self.p2, d2),
            token(self.p3, d3)
        )
    }
}
