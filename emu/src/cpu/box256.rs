//! # The Box256 CPU
//!
//! State is just memory and a program counter. Each [`Box256::step`] runs one
//! instruction:
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ fetch    memory[pc], memory[pc+1], memory[pc+2], memory[pc+3]│
//!   │            (each address wraps around the memory size)       │
//!   │ decode   opcode byte -> Opcode (undefined bytes are NOP)     │
//!   │ execute  apply the effect, jumps report their target         │
//!   │ advance  pc = target if jumped, else (pc + 4) mod size       │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is cached between steps: an instruction that rewrites the next one
//! is honored on the following fetch.

use crate::error::Result;

use super::instruction::{Instruction, SIZE_OF_INSTRUCTION};
use super::memory::Memory;
use super::ports::{NullPorts, Ports};
use super::trace::{History, TraceEntry};

pub struct Box256<P = NullPorts> {
    memory: Memory,
    program_counter: usize,
    ports: P,
    history: History,
}

impl Default for Box256 {
    fn default() -> Self {
        Self::with_ports(Memory::default(), NullPorts)
    }
}

impl Box256 {
    /// A CPU with zeroed memory of `memory_size` bytes and no devices.
    ///
    /// # Errors
    ///
    /// `memory_size` must be a positive multiple of 4.
    pub fn new(memory_size: usize) -> Result<Self> {
        Ok(Self::with_ports(Memory::new(memory_size)?, NullPorts))
    }
}

impl<P: Ports> Box256<P> {
    #[must_use]
    pub fn with_ports(memory: Memory, ports: P) -> Self {
        Self {
            memory,
            program_counter: 0,
            ports,
            history: History::default(),
        }
    }

    /// Remembers the last `capacity` executed instructions.
    #[must_use]
    pub fn with_history(mut self, capacity: usize) -> Self {
        self.history = History::new(capacity);
        self
    }

    /// Copies `program` at address 0.
    ///
    /// # Errors
    ///
    /// Fails when `program` is longer than memory.
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load(program)
    }

    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    pub(crate) const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    #[must_use]
    pub const fn program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, address: usize) {
        self.program_counter = self.memory.wrap(address);
    }

    #[must_use]
    pub const fn ports(&self) -> &P {
        &self.ports
    }

    pub const fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Reads the instruction at the program counter.
    #[must_use]
    pub fn fetch(&self) -> Instruction {
        let pc = self.program_counter;
        Instruction::from([
            self.memory.read(pc),
            self.memory.read(pc + 1),
            self.memory.read(pc + 2),
            self.memory.read(pc + 3),
        ])
    }

    pub fn step(&mut self) {
        let address = self.program_counter;
        let instruction = self.fetch();
        tracing::trace!("{address:02X}: {instruction}");

        self.history.push(TraceEntry {
            address,
            instruction,
        });

        self.program_counter = match self.execute(instruction) {
            Some(target) => target,
            None => self.memory.wrap(address + SIZE_OF_INSTRUCTION),
        };
    }

    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble_source;
    use crate::cpu::opcode::Opcode;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn cpu_with(memory_size: usize, source: &str) -> Box256 {
        let mut cpu = Box256::new(memory_size).unwrap();
        cpu.load(&assemble_source(source).unwrap()).unwrap();
        cpu
    }

    #[derive(Default)]
    struct RecordingPorts {
        reads: Vec<u8>,
        writes: Vec<(u8, u8)>,
    }

    impl Ports for RecordingPorts {
        fn input(&mut self, port: u8) -> u8 {
            self.reads.push(port);
            port.wrapping_add(0x40)
        }

        fn output(&mut self, port: u8, value: u8) {
            self.writes.push((port, value));
        }
    }

    #[test]
    fn invalid_memory_size() {
        assert_eq!(
            Box256::new(10).err(),
            Some(Error::InvalidMemorySize { size: 10 })
        );
    }

    #[test]
    fn default_cpu() {
        let cpu = Box256::default();
        assert_eq!(cpu.memory().len(), 256);
        assert_eq!(cpu.program_counter(), 0);
    }

    #[test]
    fn mov_immediate_broadcasts() {
        let mut cpu = cpu_with(32, "MOV 0AB @10 003");
        cpu.step();
        assert_eq!(&cpu.memory().as_slice()[0x10..0x14], &[0xAB, 0xAB, 0xAB, 0x00]);
        assert_eq!(cpu.program_counter(), 4);
    }

    #[test]
    fn mov_copies_byte_by_byte() {
        let mut cpu = cpu_with(32, "MOV @10 @11 003");
        cpu.memory_mut().write(0x10, 1);
        cpu.memory_mut().write(0x11, 2);
        cpu.memory_mut().write(0x12, 3);
        cpu.memory_mut().write(0x13, 4);
        cpu.step();

        // Each write is visible to the next read of the overlapping range.
        assert_eq!(&cpu.memory().as_slice()[0x10..0x14], &[1, 1, 1, 1]);
    }

    #[test]
    fn mov_double_indirect_source_and_destination() {
        let mut cpu = cpu_with(32, "MOV *10 *11 002");
        cpu.memory_mut().write(0x10, 0x18);
        cpu.memory_mut().write(0x11, 0x1C);
        cpu.memory_mut().write(0x18, 0xAA);
        cpu.memory_mut().write(0x19, 0xBB);
        cpu.step();

        assert_eq!(&cpu.memory().as_slice()[0x1C..0x20], &[0xAA, 0xBB, 0, 0]);
    }

    #[test]
    fn mov_length_from_memory() {
        let mut cpu = cpu_with(32, "MOV 007 @10 @1F");
        cpu.memory_mut().write(0x1F, 2);
        cpu.step();
        assert_eq!(&cpu.memory().as_slice()[0x10..0x13], &[7, 7, 0]);

        let mut cpu = cpu_with(32, "MOV 007 @10 @1F");
        cpu.step();
        assert_eq!(cpu.memory().read(0x10), 0);
    }

    #[test]
    fn mov_range_wraps_around_memory() {
        let mut cpu = cpu_with(16, "MOV 0EE @0E 004");
        cpu.step();
        assert_eq!(cpu.memory().read(0x0E), 0xEE);
        assert_eq!(cpu.memory().read(0x0F), 0xEE);
        assert_eq!(cpu.memory().read(0x00), 0xEE);
        assert_eq!(cpu.memory().read(0x01), 0xEE);
    }

    #[test]
    fn jmp_relative_absolute_indirect() {
        let mut cpu = cpu_with(32, "MOV 000 @1F 001 JMP 008 000 000");
        cpu.set_program_counter(4);
        cpu.step();
        assert_eq!(cpu.program_counter(), 12);

        let mut cpu = cpu_with(32, "JMP @14 000 000");
        cpu.step();
        assert_eq!(cpu.program_counter(), 0x14);

        let mut cpu = cpu_with(32, "JMP *1F 000 000");
        cpu.memory_mut().write(0x1F, 0x08);
        cpu.step();
        assert_eq!(cpu.program_counter(), 0x08);
    }

    #[test]
    fn jmp_backwards_wraps() {
        let mut cpu = cpu_with(16, "JMP -04 000 000");
        cpu.step();
        assert_eq!(cpu.program_counter(), 12);

        let mut cpu = cpu_with(16, "JMP @34 000 000");
        cpu.step();
        assert_eq!(cpu.program_counter(), 4);
    }

    #[test]
    fn jump_to_itself_loops_forever() {
        let mut cpu = cpu_with(16, "JMP 000 000 000");
        cpu.run(10);
        assert_eq!(cpu.program_counter(), 0);
    }

    #[test]
    fn conditional_jumps() {
        let mut cpu = cpu_with(32, "JEQ @1F 005 @10");
        cpu.memory_mut().write(0x1F, 5);
        cpu.step();
        assert_eq!(cpu.program_counter(), 0x10);

        let mut cpu = cpu_with(32, "JEQ @1F 005 @10");
        cpu.step();
        assert_eq!(cpu.program_counter(), 4);

        let mut cpu = cpu_with(32, "JNE @1F 005 008");
        cpu.step();
        assert_eq!(cpu.program_counter(), 8);

        let mut cpu = cpu_with(32, "JGR 0FF @1F 00C");
        cpu.step();
        assert_eq!(cpu.program_counter(), 12);

        let mut cpu = cpu_with(32, "JGR @1F 0FF 00C");
        cpu.memory_mut().write(0x1F, 0xFF);
        cpu.step();
        assert_eq!(cpu.program_counter(), 4);
    }

    #[test]
    fn arithmetic_wraps_to_a_byte() {
        let mut cpu = cpu_with(32, "ADD @10 0FF @11 SUB 001 @10 @12 MUL @10 @10 *13");
        cpu.memory_mut().write(0x10, 0x02);
        cpu.memory_mut().write(0x13, 0x18);
        cpu.run(3);

        assert_eq!(cpu.memory().read(0x11), 0x01);
        assert_eq!(cpu.memory().read(0x12), 0xFF);
        assert_eq!(cpu.memory().read(0x18), 0x04);
    }

    #[test]
    fn division_by_zero_gives_zero() {
        let mut cpu = cpu_with(32, "DIV @10 @11 @12 MOD @10 @11 @13");
        cpu.memory_mut().write(0x10, 9);
        cpu.memory_mut().write(0x12, 0xAA);
        cpu.memory_mut().write(0x13, 0xAA);
        cpu.run(2);

        assert_eq!(cpu.memory().read(0x12), 0);
        assert_eq!(cpu.memory().read(0x13), 0);
        assert_eq!(cpu.program_counter(), 8);
    }

    #[test]
    fn undefined_opcodes_are_nop() {
        let mut rng = rand::thread_rng();

        for byte in 0..=u8::MAX {
            if Opcode::from(byte) != Opcode::Nop {
                continue;
            }

            let mut cpu = Box256::new(16).unwrap();
            for address in 0..16 {
                cpu.memory_mut().write(address, rng.gen_range(0..=u8::MAX));
            }
            cpu.set_program_counter(12);
            cpu.memory_mut().write(12, byte);
            let before = cpu.memory().clone();

            cpu.step();

            assert_eq!(cpu.memory(), &before);
            assert_eq!(cpu.program_counter(), 0);
        }
    }

    #[test]
    fn fetch_wraps_around_memory() {
        let mut cpu = Box256::new(16).unwrap();
        cpu.load(&[0x0C, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01, 0x07])
            .unwrap();
        cpu.set_program_counter(14);

        let instruction = cpu.fetch();
        assert_eq!(instruction.bytes(), [0x01, 0x07, 0x0C, 0x01]);

        cpu.step();
        assert_eq!(cpu.memory().read(0x0C), 0x07);
        assert_eq!(cpu.program_counter(), 2);
    }

    #[test]
    fn self_modifying_code() {
        // The first instruction turns the second one into `JMP @AA 01F 001`.
        let jmp = u8::from(Opcode::Jmp {
            target: crate::cpu::addressing::AddressingDepth::Indirect,
        });
        let source = format!("MOV {jmp:03X} @04 001 MOV 0AA @1F 001");
        let mut cpu = cpu_with(32, &source);

        cpu.step();
        assert_eq!(cpu.memory().read(4), jmp);

        cpu.step();
        assert_eq!(cpu.memory().read(0x1F), 0);
        assert_eq!(cpu.program_counter(), 0x0A);
    }

    #[test]
    fn port_io() {
        let source = "INP 002 @10 000 INP @10 *11 000 OUT 01C 0AB 000 OUT 01D @10 000";
        let memory = Memory::with_program(32, &assemble_source(source).unwrap()).unwrap();
        let mut cpu = Box256::with_ports(memory, RecordingPorts::default());
        cpu.memory_mut().write(0x11, 0x18);
        cpu.run(4);

        assert_eq!(cpu.memory().read(0x10), 0x42);
        assert_eq!(cpu.memory().read(0x18), 0x82);
        assert_eq!(cpu.ports().reads, vec![0x02, 0x42]);
        assert_eq!(cpu.ports().writes, vec![(0x1C, 0xAB), (0x1D, 0x42)]);
    }

    #[test]
    fn null_ports_read_zero() {
        let mut cpu = cpu_with(16, "INP 002 @0C 000");
        cpu.memory_mut().write(0x0C, 0x55);
        cpu.step();
        assert_eq!(cpu.memory().read(0x0C), 0);
    }

    #[test]
    fn history_keeps_latest_steps() {
        let mut cpu = cpu_with(16, "JMP 000 000 000").with_history(2);
        cpu.run(3);

        let history: Vec<_> = cpu.history().iter().map(ToString::to_string).collect();
        assert_eq!(history, vec!["00: JMP 000 000 000", "00: JMP 000 000 000"]);
    }

    #[test]
    fn program_counter_moves_to_jump_target_or_next_instruction() {
        use crate::cpu::addressing::AddressingDepth;

        let mut rng = rand::thread_rng();

        for _ in 0..2000 {
            let mut cpu = Box256::new(64).unwrap();
            for address in 0..64 {
                cpu.memory_mut().write(address, rng.gen_range(0..=u8::MAX));
            }
            let pc = rng.gen_range(0..16) * SIZE_OF_INSTRUCTION;
            cpu.set_program_counter(pc);

            let before = cpu.memory().clone();
            let instruction = cpu.fetch();
            cpu.step();

            let resolve = |raw: u8, depth: AddressingDepth| match depth {
                AddressingDepth::Immediate => (pc + usize::from(raw)) % 64,
                AddressingDepth::Indirect => usize::from(raw) % 64,
                AddressingDepth::DoubleIndirect => usize::from(before.read(raw.into())) % 64,
            };
            let next = (pc + SIZE_OF_INSTRUCTION) % 64;
            let expected = match instruction.opcode {
                Opcode::Jmp { target } => resolve(instruction.p1, target),
                Opcode::Branch {
                    condition,
                    left,
                    right,
                    target,
                } => {
                    let left = before.value(instruction.p1, left);
                    let right = before.value(instruction.p2, right);
                    if condition.holds(left, right) {
                        resolve(instruction.p3, target)
                    } else {
                        next
                    }
                }
                _ => next,
            };

            assert_eq!(cpu.program_counter(), expected, "{instruction}");
        }
    }
}
