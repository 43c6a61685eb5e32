use crate::cpu::addressing::AddressingDepth;

/// A parsed operand token: its addressing depth and raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub depth: AddressingDepth,
    pub value: u8,
}

impl Operand {
    #[must_use]
    pub const fn immediate(value: u8) -> Self {
        Self {
            depth: AddressingDepth::Immediate,
            value,
        }
    }
}

impl From<&str> for Operand {
    fn from(token: &str) -> Self {
        Self {
            depth: AddressingDepth::from_prefix(token),
            value: parse_value(token),
        }
    }
}

/// Reads the byte of an operand token, ignoring its addressing prefix.
///
/// Digits are hexadecimal and may be negated with a leading `-`, the result
/// keeps the low 8 bits (`-04` is `0xFC`, `1FF` is `0xFF`). Malformed tokens
/// give 0.
#[must_use]
pub fn parse_value(token: &str) -> u8 {
    let digits = token.trim_start_matches(['@', '*']);
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, digits),
    };

    let Ok(magnitude) = u32::from_str_radix(digits, 16) else {
        tracing::trace!("Treating malformed operand {token:?} as 0");
        return 0;
    };

    let [byte, ..] = magnitude.to_le_bytes();
    if negative { byte.wrapping_neg() } else { byte }
}
