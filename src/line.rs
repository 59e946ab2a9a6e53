/*!
  # Line driver for the two I2C signal lines

  The protocol layers never touch pins directly. They go through a
  [`LineDriver`], which exposes CLOCK and DATA as direction-switchable,
  readable and writable lines plus a fixed settle delay.

  [`HalLines`] implements the driver on top of `embedded-hal` pins:

  - SCL: an open-drain `OutputPin`
  - SDA: an open-drain `OutputPin + InputPin`
  - a periodic `CountDown` timer; one period is one delay unit

  On open-drain pins switching a line to [`Direction::Input`] releases it
  (drives it high) so the slave can pull it low. Switching back to
  [`Direction::Output`] drives the last level set on the line.
*/

use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::timer::{CountDown, Periodic};
use nb::block;

/// Identity of a bus line
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// SCL
    Clock,
    /// SDA
    Data,
}

/// Direction of a bus line
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master drives the line
    Output,
    /// Master releases the line and samples it
    Input,
}

/// Live state of one signal line
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalLine {
    /// Which line this is
    pub line: Line,
    /// Current direction
    pub direction: Direction,
    /// Level driven while the line is an output
    pub high: bool,
}

impl SignalLine {
    /// Line in the idle bus state: output, high
    pub const fn idle(line: Line) -> Self {
        SignalLine {
            line,
            direction: Direction::Output,
            high: true,
        }
    }

    /// Whether the line is an output driven high
    pub fn is_idle(&self) -> bool {
        self.direction == Direction::Output && self.high
    }
}

/// Access to the CLOCK and DATA lines
///
/// Register-backed drivers cannot fail and use `Infallible` as their error.
pub trait LineDriver {
    /// Error reported by the underlying pins
    type Error;

    /// Switch `line` between driving and sampling.
    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error>;

    /// Set the level driven on `line`.
    fn set_level(&mut self, line: Line, high: bool) -> Result<(), Self::Error>;

    /// Sample the level on `line`.
    fn read_level(&mut self, line: Line) -> Result<bool, Self::Error>;

    /// Busy-wait for `units` settle periods.
    fn delay(&mut self, units: u32);
}

/// Line driver over `embedded-hal` open-drain pins and a periodic timer
pub struct HalLines<SCL, SDA, CLK>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    CLK: CountDown + Periodic,
{
    scl: SCL,
    sda: SDA,
    clk: CLK,
    clock: SignalLine,
    data: SignalLine,
}

impl<SCL, SDA, CLK, E> HalLines<SCL, SDA, CLK>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    CLK: CountDown + Periodic,
{
    /// Create instance
    ///
    /// The timer must already be running. Pins are assumed to be released
    /// (idle high) until the first operation drives them.
    pub fn new(scl: SCL, sda: SDA, clk: CLK) -> Self {
        HalLines {
            scl,
            sda,
            clk,
            clock: SignalLine::idle(Line::Clock),
            data: SignalLine::idle(Line::Data),
        }
    }

    /// Give the pins and the timer back.
    pub fn destroy(self) -> (SCL, SDA, CLK) {
        (self.scl, self.sda, self.clk)
    }

    /// Tracked state of `line`
    pub fn signal(&self, line: Line) -> SignalLine {
        match line {
            Line::Clock => self.clock,
            Line::Data => self.data,
        }
    }

    fn state_mut(&mut self, line: Line) -> &mut SignalLine {
        match line {
            Line::Clock => &mut self.clock,
            Line::Data => &mut self.data,
        }
    }

    // Puts the tracked state of `line` on the pin.
    fn apply(&mut self, line: Line) -> Result<(), E> {
        let state = self.signal(line);
        let high = state.direction == Direction::Input || state.high;
        match (line, high) {
            (Line::Clock, true) => self.scl.set_high(),
            (Line::Clock, false) => self.scl.set_low(),
            (Line::Data, true) => self.sda.set_high(),
            (Line::Data, false) => self.sda.set_low(),
        }
    }
}

impl<SCL, SDA, CLK, E> LineDriver for HalLines<SCL, SDA, CLK>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    CLK: CountDown + Periodic,
{
    type Error = E;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), E> {
        self.state_mut(line).direction = direction;
        self.apply(line)
    }

    fn set_level(&mut self, line: Line, high: bool) -> Result<(), E> {
        self.state_mut(line).high = high;
        self.apply(line)
    }

    fn read_level(&mut self, line: Line) -> Result<bool, E> {
        match line {
            // SCL is output-only, report what we drive
            Line::Clock => Ok(self.clock.direction == Direction::Input || self.clock.high),
            Line::Data => self.sda.is_high(),
        }
    }

    #[inline]
    fn delay(&mut self, units: u32) {
        for _ in 0..units {
            block!(self.clk.wait()).ok();
        }
    }
}
