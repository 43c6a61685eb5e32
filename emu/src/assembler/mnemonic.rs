use std::str::FromStr;

use crate::cpu::addressing::{AddressingDepth, Indirection};
use crate::cpu::opcode::{ArithmeticOp, Comparison, Opcode};
use crate::error::Error;

/// Instruction names recognized in source. Matching is case sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Mov,
    Jmp,
    Jeq,
    Jne,
    Jgr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inp,
    Out,
}

impl FromStr for Mnemonic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOV" => Ok(Self::Mov),
            "JMP" => Ok(Self::Jmp),
            "JEQ" => Ok(Self::Jeq),
            "JNE" => Ok(Self::Jne),
            "JGR" => Ok(Self::Jgr),
            "ADD" => Ok(Self::Add),
            "SUB" => Ok(Self::Sub),
            "MUL" => Ok(Self::Mul),
            "DIV" => Ok(Self::Div),
            "MOD" => Ok(Self::Mod),
            "INP" => Ok(Self::Inp),
            "OUT" => Ok(Self::Out),
            _ => Err(Error::UnknownMnemonic {
                mnemonic: s.to_owned(),
            }),
        }
    }
}

impl Mnemonic {
    #[must_use]
    pub const fn comparison(self) -> Option<Comparison> {
        match self {
            Self::Jeq => Some(Comparison::Equal),
            Self::Jne => Some(Comparison::NotEqual),
            Self::Jgr => Some(Comparison::Greater),
            _ => None,
        }
    }

    #[must_use]
    pub const fn arithmetic(self) -> Option<ArithmeticOp> {
        match self {
            Self::Add => Some(ArithmeticOp::Add),
            Self::Sub => Some(ArithmeticOp::Sub),
            Self::Mul => Some(ArithmeticOp::Mul),
            Self::Div => Some(ArithmeticOp::Div),
            Self::Mod => Some(ArithmeticOp::Mod),
            _ => None,
        }
    }

    /// Whether the first two operands may be swapped without changing the
    /// result.
    #[must_use]
    pub fn is_commutative(self) -> bool {
        self.comparison().is_some_and(Comparison::is_commutative)
            || self.arithmetic().is_some_and(ArithmeticOp::is_commutative)
    }

    /// Opcode for this mnemonic with the given operand depths. Combinations
    /// without a byte in the opcode space (an immediate destination, two
    /// immediate sources, a non canonical commutative pair) give NOP.
    #[must_use]
    pub fn opcode(self, d1: AddressingDepth, d2: AddressingDepth, d3: AddressingDepth) -> Opcode {
        let opcode = match self {
            Self::Mov => Indirection::try_from(d2).ok().map(|destination| Opcode::Mov {
                source: d1,
                destination,
                length: d3,
            }),
            Self::Jmp => Some(Opcode::Jmp { target: d1 }),
            Self::Jeq | Self::Jne | Self::Jgr => self.comparison().map(|condition| Opcode::Branch {
                condition,
                left: d1,
                right: d2,
                target: d3,
            }),
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod => {
                self.arithmetic().zip(Indirection::try_from(d3).ok()).map(
                    |(operation, destination)| Opcode::Arithmetic {
                        operation,
                        left: d1,
                        right: d2,
                        destination,
                    },
                )
            }
            Self::Inp => Indirection::try_from(d2)
                .ok()
                .map(|destination| Opcode::Input {
                    port: d1,
                    destination,
                }),
            Self::Out => Some(Opcode::Output {
                port: d1,
                value: d2,
            }),
        };

        opcode.filter(Opcode::is_defined).unwrap_or_default()
    }
}
