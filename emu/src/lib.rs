pub mod assembler;
pub mod cpu;
pub mod error;

pub use assembler::{assemble_program, assemble_source};
pub use cpu::box256::Box256;
pub use cpu::memory::Memory;
