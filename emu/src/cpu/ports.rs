//! # Port I/O
//!
//! `INP` and `OUT` talk to devices owned by the host. The CPU only resolves
//! the port number (and the value for `OUT`) and calls into [`Ports`]; what a
//! port means is up to the implementation.
//!
//! ```text
//! INP 002 @34 000   ; read port 2, store the byte at 0x34
//! OUT 01C 0AB 000   ; write 0xAB to port 0x1C
//! OUT 01D @56 000   ; write the byte at 0x56 to port 0x1D
//! ```

/// Host side of the `INP`/`OUT` instructions.
///
/// Calls are synchronous and happen inside a single step.
pub trait Ports {
    fn input(&mut self, port: u8) -> u8;

    fn output(&mut self, port: u8, value: u8);
}

/// No devices attached: reads give 0, writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPorts;

impl Ports for NullPorts {
    fn input(&mut self, _port: u8) -> u8 {
        0
    }

    fn output(&mut self, _port: u8, _value: u8) {}
}

impl<P: Ports + ?Sized> Ports for &mut P {
    fn input(&mut self, port: u8) -> u8 {
        (**self).input(port)
    }

    fn output(&mut self, port: u8, value: u8) {
        (**self).output(port, value);
    }
}

impl<P: Ports + ?Sized> Ports for Box<P> {
    fn input(&mut self, port: u8) -> u8 {
        (**self).input(port)
    }

    fn output(&mut self, port: u8, value: u8) {
        (**self).output(port, value);
    }
}
