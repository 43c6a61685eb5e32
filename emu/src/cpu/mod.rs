pub mod addressing;

#[allow(clippy::module_name_repetitions)]
pub mod box256;
pub mod instruction;
pub mod memory;
pub mod opcode;
mod operations;
pub mod ports;
pub mod trace;
