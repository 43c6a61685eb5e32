//! # Opcode Space
//!
//! An opcode byte identifies an effect family together with the addressing
//! depth of every operand it uses, so the interpreter never looks at source
//! text or prefixes at run time.
//!
//! ## Byte Layout
//!
//! `0x00` is NOP, so zeroed memory executes harmlessly. The defined opcodes
//! follow from `0x01` in family order; inside a family the last operand's
//! depth varies slowest and the first operand's fastest:
//!
//! ```text
//! ┌─────────────┬────────┬─────────────────────────────────────────────┐
//! │ Bytes       │ Family │ Operand depths                              │
//! ├─────────────┼────────┼─────────────────────────────────────────────┤
//! │ 0x00        │ NOP    │                                             │
//! │ 0x01 - 0x12 │ MOV    │ source 0-2, destination 1-2, length 0-2     │
//! │ 0x13 - 0x15 │ JMP    │ target 0-2                                  │
//! │ 0x16 - 0x24 │ JEQ    │ left >= right, not both 0, target 0-2       │
//! │ 0x25 - 0x33 │ JNE    │ left >= right, not both 0, target 0-2       │
//! │ 0x34 - 0x4B │ JGR    │ not both 0, target 0-2                      │
//! │ 0x4C - 0x55 │ ADD    │ left >= right, not both 0, destination 1-2  │
//! │ 0x56 - 0x65 │ SUB    │ not both 0, destination 1-2                 │
//! │ 0x66 - 0x6F │ MUL    │ left >= right, not both 0, destination 1-2  │
//! │ 0x70 - 0x7F │ DIV    │ not both 0, destination 1-2                 │
//! │ 0x80 - 0x8F │ MOD    │ not both 0, destination 1-2                 │
//! │ 0x90 - 0x95 │ INP    │ port 0-2, destination 1-2                   │
//! │ 0x96 - 0x9E │ OUT    │ port 0-2, value 0-2                         │
//! │ 0x9F - 0xFF │ NOP    │                                             │
//! └─────────────┴────────┴─────────────────────────────────────────────┘
//! ```
//!
//! Two immediate sources never need an opcode (the assembler folds them) and
//! commutative families only exist with the deeper operand first (the
//! assembler swaps them).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::addressing::{AddressingDepth, Indirection};

static OPCODE_TABLE: Lazy<OpcodeTable> = Lazy::new(OpcodeTable::build);

/// Comparison performed by a conditional jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// `JEQ`: jump when both values are equal.
    Equal,

    /// `JNE`: jump when the values differ.
    NotEqual,

    /// `JGR`: jump when the left value is strictly greater (unsigned).
    Greater,
}

impl Comparison {
    pub const ALL: [Self; 3] = [Self::Equal, Self::NotEqual, Self::Greater];

    #[must_use]
    pub const fn holds(self, left: u8, right: u8) -> bool {
        match self {
            Self::Equal => left == right,
            Self::NotEqual => left != right,
            Self::Greater => left > right,
        }
    }

    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Equal => "JEQ",
            Self::NotEqual => "JNE",
            Self::Greater => "JGR",
        }
    }
}

/// Operation performed by an arithmetic opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    pub const ALL: [Self; 5] = [Self::Add, Self::Sub, Self::Mul, Self::Div, Self::Mod];

    /// Computes the 8-bit result. Add, sub and mul wrap around; div and mod
    /// give 0 when either operand is 0.
    #[must_use]
    pub const fn apply(self, left: u8, right: u8) -> u8 {
        match self {
            Self::Add => left.wrapping_add(right),
            Self::Sub => left.wrapping_sub(right),
            Self::Mul => left.wrapping_mul(right),
            Self::Div => {
                if left == 0 || right == 0 {
                    0
                } else {
                    left / right
                }
            }
            Self::Mod => {
                if left == 0 || right == 0 {
                    0
                } else {
                    left % right
                }
            }
        }
    }

    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(self, Self::Add | Self::Mul)
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
        }
    }
}

/// A decoded opcode byte: the effect family and the depth of each operand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    #[default]
    Nop,

    /// `MOV source destination length`
    Mov {
        source: AddressingDepth,
        destination: Indirection,
        length: AddressingDepth,
    },

    /// `JMP target`
    Jmp { target: AddressingDepth },

    /// `JEQ|JNE|JGR left right target`
    Branch {
        condition: Comparison,
        left: AddressingDepth,
        right: AddressingDepth,
        target: AddressingDepth,
    },

    /// `ADD|SUB|MUL|DIV|MOD left right destination`
    Arithmetic {
        operation: ArithmeticOp,
        left: AddressingDepth,
        right: AddressingDepth,
        destination: Indirection,
    },

    /// `INP port destination`
    Input {
        port: AddressingDepth,
        destination: Indirection,
    },

    /// `OUT port value`
    Output {
        port: AddressingDepth,
        value: AddressingDepth,
    },
}

impl Opcode {
    /// Whether this combination has a byte in the opcode space.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        match *self {
            Self::Branch {
                condition,
                left,
                right,
                ..
            } => is_encodable_pair(left, right, condition.is_commutative()),
            Self::Arithmetic {
                operation,
                left,
                right,
                ..
            } => is_encodable_pair(left, right, operation.is_commutative()),
            Self::Nop
            | Self::Mov { .. }
            | Self::Jmp { .. }
            | Self::Input { .. }
            | Self::Output { .. } => true,
        }
    }

    /// Mnemonic of the family, `None` for NOP.
    #[must_use]
    pub const fn mnemonic(&self) -> Option<&'static str> {
        match self {
            Self::Nop => None,
            Self::Mov { .. } => Some("MOV"),
            Self::Jmp { .. } => Some("JMP"),
            Self::Branch { condition, .. } => Some(condition.mnemonic()),
            Self::Arithmetic { operation, .. } => Some(operation.mnemonic()),
            Self::Input { .. } => Some("INP"),
            Self::Output { .. } => Some("OUT"),
        }
    }

    /// Addressing depth of each of the three operand slots. Unused slots
    /// are reported as immediate.
    #[must_use]
    pub fn operand_depths(&self) -> [AddressingDepth; 3] {
        use AddressingDepth::Immediate;

        match *self {
            Self::Nop => [Immediate; 3],
            Self::Mov {
                source,
                destination,
                length,
            } => [source, destination.into(), length],
            Self::Jmp { target } => [target, Immediate, Immediate],
            Self::Branch {
                left,
                right,
                target,
                ..
            } => [left, right, target],
            Self::Arithmetic {
                left,
                right,
                destination,
                ..
            } => [left, right, destination.into()],
            Self::Input { port, destination } => [port, destination.into(), Immediate],
            Self::Output { port, value } => [port, value, Immediate],
        }
    }

    /// Every defined opcode in byte order, starting from `0x01`.
    fn enumerate() -> Vec<Self> {
        let depths = AddressingDepth::ALL;
        let mut opcodes = Vec::new();

        for length in depths {
            for destination in Indirection::ALL {
                for source in depths {
                    opcodes.push(Self::Mov {
                        source,
                        destination,
                        length,
                    });
                }
            }
        }

        for target in depths {
            opcodes.push(Self::Jmp { target });
        }

        for condition in Comparison::ALL {
            for target in depths {
                for right in depths {
                    for left in depths {
                        opcodes.push(Self::Branch {
                            condition,
                            left,
                            right,
                            target,
                        });
                    }
                }
            }
        }

        for operation in ArithmeticOp::ALL {
            for destination in Indirection::ALL {
                for right in depths {
                    for left in depths {
                        opcodes.push(Self::Arithmetic {
                            operation,
                            left,
                            right,
                            destination,
                        });
                    }
                }
            }
        }

        for destination in Indirection::ALL {
            for port in depths {
                opcodes.push(Self::Input { port, destination });
            }
        }

        for value in depths {
            for port in depths {
                opcodes.push(Self::Output { port, value });
            }
        }

        opcodes.retain(Self::is_defined);
        opcodes
    }
}

fn is_encodable_pair(left: AddressingDepth, right: AddressingDepth, commutative: bool) -> bool {
    let both_immediate = left == AddressingDepth::Immediate && right == AddressingDepth::Immediate;
    !both_immediate && (!commutative || left >= right)
}

struct OpcodeTable {
    decode: [Opcode; 256],
    encode: HashMap<Opcode, u8>,
}

impl OpcodeTable {
    fn build() -> Self {
        let opcodes = Opcode::enumerate();
        debug_assert!(opcodes.len() < 256, "opcode space overflow");

        let mut decode = [Opcode::Nop; 256];
        let mut encode = HashMap::with_capacity(opcodes.len() + 1);
        encode.insert(Opcode::Nop, 0);

        for (byte, opcode) in (1..=u8::MAX).zip(opcodes) {
            decode[usize::from(byte)] = opcode;
            encode.insert(opcode, byte);
        }

        Self { decode, encode }
    }
}

impl From<u8> for Opcode {
    fn from(byte: u8) -> Self {
        let opcode = OPCODE_TABLE.decode[usize::from(byte)];
        if opcode == Self::Nop && byte != 0 {
            tracing::trace!("Treating undefined opcode 0x{byte:02X} as NOP");
        }
        opcode
    }
}

impl From<Opcode> for u8 {
    /// Undefined combinations encode as NOP (`0x00`).
    fn from(opcode: Opcode) -> Self {
        OPCODE_TABLE.encode.get(&opcode).copied().unwrap_or(0)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Nop => f.write_str("NOP"),
            Self::Mov {
                source,
                destination,
                length,
            } => write!(f, "MOV{source}{destination}{length}"),
            Self::Jmp { target } => write!(f, "JMP{target}"),
            Self::Branch {
                condition,
                left,
                right,
                target,
            } => write!(f, "{}{left}{right}{target}", condition.mnemonic()),
            Self::Arithmetic {
                operation,
                left,
                right,
                destination,
            } => write!(f, "{}{left}{right}{destination}", operation.mnemonic()),
            Self::Input { port, destination } => write!(f, "INP{port}{destination}"),
            Self::Output { port, value } => write!(f, "OUT{port}{value}"),
        }
    }
}
