//! Bit and byte transfer primitives
//!
//! [`Wire`] clocks single bits and whole bytes over a [`LineDriver`], with a
//! fixed number of settle units between edges. Bus conditions (START, STOP,
//! idle) live here too so the engine only sequences them.

use core::ops::{Deref, DerefMut};

use crate::line::{Direction, Line, LineDriver};

/// Bit-level access to the bus
pub struct Wire<L: LineDriver> {
    lines: L,
    settle_units: u32,
}

impl<L: LineDriver> Wire<L> {
    /// Create instance, `settle_units` is the delay between edges
    pub fn new(lines: L, settle_units: u32) -> Self {
        Wire {
            lines,
            settle_units,
        }
    }

    /// Underlying line driver
    pub fn lines(&self) -> &L {
        &self.lines
    }

    /// Give the line driver back.
    pub fn release(self) -> L {
        self.lines
    }

    #[inline]
    fn settle(&mut self) {
        self.lines.delay(self.settle_units);
    }

    /// Drive both lines as outputs, high.
    pub fn idle(&mut self) -> Result<(), L::Error> {
        self.lines.set_direction(Line::Clock, Direction::Output)?;
        self.lines.set_level(Line::Clock, true)?;
        self.lines.set_direction(Line::Data, Direction::Output)?;
        self.lines.set_level(Line::Data, true)?;
        self.settle();
        Ok(())
    }

    /// START condition: DATA falls while CLOCK is high, then CLOCK falls.
    pub fn start(&mut self) -> Result<(), L::Error> {
        // no-op on an idle bus
        self.lines.set_level(Line::Data, true)?;
        self.lines.set_level(Line::Clock, true)?;

        self.lines.set_level(Line::Data, false)?;
        self.settle();

        self.lines.set_level(Line::Clock, false)?;
        self.settle();

        Ok(())
    }

    /// STOP condition: CLOCK rises, then DATA rises. Leaves the bus idle.
    pub fn stop(&mut self) -> Result<(), L::Error> {
        // CLOCK is low here, so DATA may move without clocking a bit
        self.lines.set_level(Line::Data, false)?;

        self.lines.set_level(Line::Clock, true)?;
        self.settle();

        self.lines.set_level(Line::Data, true)?;
        self.settle();

        Ok(())
    }

    /// Clock one bit out. DATA must be an output.
    pub fn send_bit(&mut self, high: bool) -> Result<(), L::Error> {
        self.lines.set_level(Line::Data, high)?;
        self.settle();

        self.lines.set_level(Line::Clock, true)?;
        self.settle();

        self.lines.set_level(Line::Clock, false)?;
        self.settle();

        Ok(())
    }

    /// Clock one bit in. DATA must be an input.
    pub fn recv_bit(&mut self) -> Result<bool, L::Error> {
        self.lines.set_level(Line::Clock, true)?;
        self.settle();

        let high = self.lines.read_level(Line::Data)?;

        self.lines.set_level(Line::Clock, false)?;
        self.settle();

        Ok(high)
    }

    /// Send `byte` MSB first and sample the acknowledgment.
    ///
    /// Returns `true` when the slave pulled DATA low during the ACK pulse.
    pub fn send_byte(&mut self, byte: u8) -> Result<bool, L::Error> {
        let mut out = byte;
        for _ in 0..8 {
            self.send_bit(out & 0x80 != 0)?;
            out <<= 1;
        }

        let mut window = InputWindow::open(self)?;

        window.lines.set_level(Line::Clock, true)?;
        window.settle();

        let nack = window.lines.read_level(Line::Data)?;

        window.lines.set_level(Line::Clock, false)?;
        window.settle();

        window.close()?;

        Ok(!nack)
    }

    /// Receive a byte MSB first, then ACK it, or NACK it when `last` is set.
    ///
    /// DATA is an output on entry and on return.
    pub fn recv_byte(&mut self, last: bool) -> Result<u8, L::Error> {
        let mut window = InputWindow::open(self)?;

        let mut byte: u8 = 0;
        for _ in 0..8 {
            byte = (byte << 1) | window.recv_bit()? as u8;
        }

        window.close()?;

        // ACK is DATA low, NACK is DATA high
        self.send_bit(last)?;

        Ok(byte)
    }
}

/// DATA switched to input for as long as the window lives
///
/// Dropping the window switches DATA back to output, whatever path the
/// caller leaves by. [`InputWindow::close`] does the same and reports the
/// restore error.
pub struct InputWindow<'a, L: LineDriver> {
    wire: &'a mut Wire<L>,
    open: bool,
}

impl<'a, L: LineDriver> InputWindow<'a, L> {
    /// Release DATA so the slave can drive it.
    pub fn open(wire: &'a mut Wire<L>) -> Result<Self, L::Error> {
        wire.lines.set_direction(Line::Data, Direction::Input)?;
        Ok(InputWindow { wire, open: true })
    }

    /// Switch DATA back to output.
    pub fn close(mut self) -> Result<(), L::Error> {
        self.open = false;
        self.wire.lines.set_direction(Line::Data, Direction::Output)
    }
}

impl<'a, L: LineDriver> Deref for InputWindow<'a, L> {
    type Target = Wire<L>;

    fn deref(&self) -> &Wire<L> {
        self.wire
    }
}

impl<'a, L: LineDriver> DerefMut for InputWindow<'a, L> {
    fn deref_mut(&mut self) -> &mut Wire<L> {
        self.wire
    }
}

impl<'a, L: LineDriver> Drop for InputWindow<'a, L> {
    fn drop(&mut self) {
        if self.open {
            self.wire
                .lines
                .set_direction(Line::Data, Direction::Output)
                .ok();
        }
    }
}
