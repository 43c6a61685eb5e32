//! Effects of every opcode family.
//!
//! Instruction functions return the jump target when the program counter
//! must not auto-advance, `None` otherwise.

use super::addressing::{AddressingDepth, Indirection};
use super::box256::Box256;
use super::instruction::Instruction;
use super::opcode::{ArithmeticOp, Comparison, Opcode};
use super::ports::Ports;

impl<P: Ports> Box256<P> {
    pub(crate) fn execute(&mut self, instruction: Instruction) -> Option<usize> {
        let Instruction { p1, p2, p3, .. } = instruction;

        match instruction.opcode {
            Opcode::Nop => None,
            Opcode::Mov {
                source,
                destination,
                length,
            } => self.mov((p1, source), (p2, destination), (p3, length)),
            Opcode::Jmp { target } => Some(self.jump_target(p1, target)),
            Opcode::Branch {
                condition,
                left,
                right,
                target,
            } => self.branch(condition, (p1, left), (p2, right), (p3, target)),
            Opcode::Arithmetic {
                operation,
                left,
                right,
                destination,
            } => self.arithmetic(operation, (p1, left), (p2, right), (p3, destination)),
            Opcode::Input { port, destination } => self.input((p1, port), (p2, destination)),
            Opcode::Output { port, value } => self.output((p1, port), (p2, value)),
        }
    }

    /// Copies `length` bytes from source to destination, one byte at a time
    /// from low to high addresses. An immediate source is written to every
    /// destination byte.
    fn mov(
        &mut self,
        (source, source_depth): (u8, AddressingDepth),
        (destination, indirection): (u8, Indirection),
        (length, length_depth): (u8, AddressingDepth),
    ) -> Option<usize> {
        let memory = self.memory();
        let length = usize::from(memory.value(length, length_depth));
        let destination = memory.address(destination, indirection);

        let from = match source_depth {
            AddressingDepth::Immediate => {
                for offset in 0..length {
                    self.memory_mut().write(destination + offset, source);
                }
                return None;
            }
            AddressingDepth::Indirect => memory.address(source, Indirection::Single),
            AddressingDepth::DoubleIndirect => memory.address(source, Indirection::Double),
        };

        for offset in 0..length {
            let byte = self.memory().read(from + offset);
            self.memory_mut().write(destination + offset, byte);
        }

        None
    }

    /// Absolute address a jump operand designates. Immediate targets are
    /// relative to the jumping instruction.
    fn jump_target(&self, target: u8, depth: AddressingDepth) -> usize {
        let memory = self.memory();

        match depth {
            AddressingDepth::Immediate => memory.wrap(self.program_counter() + usize::from(target)),
            AddressingDepth::Indirect => memory.address(target, Indirection::Single),
            AddressingDepth::DoubleIndirect => memory.address(target, Indirection::Double),
        }
    }

    fn branch(
        &self,
        condition: Comparison,
        (left, left_depth): (u8, AddressingDepth),
        (right, right_depth): (u8, AddressingDepth),
        (target, target_depth): (u8, AddressingDepth),
    ) -> Option<usize> {
        let left = self.memory().value(left, left_depth);
        let right = self.memory().value(right, right_depth);

        condition
            .holds(left, right)
            .then(|| self.jump_target(target, target_depth))
    }

    fn arithmetic(
        &mut self,
        operation: ArithmeticOp,
        (left, left_depth): (u8, AddressingDepth),
        (right, right_depth): (u8, AddressingDepth),
        (destination, indirection): (u8, Indirection),
    ) -> Option<usize> {
        let left = self.memory().value(left, left_depth);
        let right = self.memory().value(right, right_depth);
        let destination = self.memory().address(destination, indirection);

        self.memory_mut().write(destination, operation.apply(left, right));

        None
    }

    fn input(
        &mut self,
        (port, port_depth): (u8, AddressingDepth),
        (destination, indirection): (u8, Indirection),
    ) -> Option<usize> {
        let port = self.memory().value(port, port_depth);
        let destination = self.memory().address(destination, indirection);

        let value = self.ports_mut().input(port);
        tracing::debug!(port, value, "input");
        self.memory_mut().write(destination, value);

        None
    }

    fn output(
        &mut self,
        (port, port_depth): (u8, AddressingDepth),
        (value, value_depth): (u8, AddressingDepth),
    ) -> Option<usize> {
        let port = self.memory().value(port, port_depth);
        let value = self.memory().value(value, value_depth);

        tracing::debug!(port, value, "output");
        self.ports_mut().output(port, value);

        None
    }
}
