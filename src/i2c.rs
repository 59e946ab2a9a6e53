/*!
  # Bit-banged I2C master transaction engine

  The engine owns a [`LineDriver`] and runs one transaction at a time to
  completion: START, every byte in order, then STOP. The first byte the
  slave does not acknowledge aborts the transaction; the bus is released
  the same way as after STOP and [`Error::NoAck`] is returned. There is no
  retry.

  The caller lays the bytes out exactly as they go on the wire, address
  byte first. For an SAA1064 LED driver at `0x76`:

  ```
  use bitbang_i2c::{Config, Engine, LineDriver, Line, Direction};

  # struct Register;
  # impl LineDriver for Register {
  #     type Error = core::convert::Infallible;
  #     fn set_direction(&mut self, _: Line, _: Direction) -> Result<(), Self::Error> { Ok(()) }
  #     fn set_level(&mut self, _: Line, _: bool) -> Result<(), Self::Error> { Ok(()) }
  #     fn read_level(&mut self, _: Line) -> Result<bool, Self::Error> { Ok(false) }
  #     fn delay(&mut self, _: u32) {}
  # }
  let mut engine = Engine::new(Register, Config::default());
  engine.init().unwrap();

  let frame = [0x76, 0x00, 0x37, 0x30, 0x00, 0x00, 0x00];
  if engine.transmit(&frame).is_err() {
      // flash the error LED
  }
  ```

  Clock stretching, arbitration and multi-master buses are not supported.
*/

use embedded_hal::blocking::i2c::{Read, Write};
use log::{debug, trace};

use crate::config::Config;
use crate::line::LineDriver;
use crate::transaction::Transaction;
use crate::transfer::Wire;

/// I2C error
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Line driver error
    Bus(E),
    /// No ack received
    NoAck,
}

/// Where the engine is within a transaction
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Idle,
    Start,
    /// Sending the byte at this index
    Sending(usize),
    Stop,
    Abort,
}

/// Bit banging I2C master
pub struct Engine<L: LineDriver> {
    wire: Wire<L>,
}

impl<L: LineDriver> Engine<L> {
    /// Create instance
    pub fn new(lines: L, config: Config) -> Self {
        Engine {
            wire: Wire::new(lines, config.settle_units),
        }
    }

    /// Put both lines in the idle state: outputs, high.
    pub fn init(&mut self) -> Result<(), Error<L::Error>> {
        self.wire.idle().map_err(Error::Bus)
    }

    /// Underlying line driver
    pub fn lines(&self) -> &L {
        self.wire.lines()
    }

    /// Give the line driver back.
    pub fn release(self) -> L {
        self.wire.release()
    }

    /// Put `bytes` on the wire as one transaction.
    ///
    /// Stops at the first byte that is not acknowledged. On return both
    /// lines are outputs and high, whatever the outcome.
    pub fn transmit(&mut self, bytes: &[u8]) -> Result<(), Error<L::Error>> {
        self.guarded(|engine| engine.run(&[], bytes))
    }

    /// Run `transaction` and record its outcome.
    ///
    /// Returns `true` when every byte was acknowledged.
    pub fn execute(&mut self, transaction: &mut Transaction<'_>) -> bool {
        let success = self.transmit(transaction.bytes()).is_ok();
        transaction.finish(success);
        success
    }

    /// Read `buffer.len()` bytes from the slave at 7-bit `address`.
    ///
    /// Every byte but the last is acknowledged. An empty buffer puts nothing
    /// on the wire.
    pub fn receive(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error<L::Error>> {
        if buffer.is_empty() {
            return Ok(());
        }

        self.guarded(|engine| {
            // ST
            engine.wire.start().map_err(Error::Bus)?;

            // SAD + R
            if !engine.wire.send_byte((address << 1) | 0x1).map_err(Error::Bus)? {
                debug!("i2c: read address {:#04x} not acknowledged", address);
                engine.wire.stop().map_err(Error::Bus)?;
                return Err(Error::NoAck);
            }

            let last = buffer.len() - 1;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = engine.wire.recv_byte(i == last).map_err(Error::Bus)?;
            }

            // SP
            engine.wire.stop().map_err(Error::Bus)
        })
    }

    // Runs `op`, and after a line error tries to leave the bus idle anyway.
    fn guarded<F>(&mut self, op: F) -> Result<(), Error<L::Error>>
    where
        F: FnOnce(&mut Self) -> Result<(), Error<L::Error>>,
    {
        let result = op(self);
        if let Err(Error::Bus(_)) = result {
            self.wire.idle().ok();
        }
        result
    }

    // Sends `head` then `body` between START and STOP.
    fn run(&mut self, head: &[u8], body: &[u8]) -> Result<(), Error<L::Error>> {
        let mut state = State::Start;
        loop {
            trace!("i2c: {:?}", state);
            state = match state {
                State::Idle => return Ok(()),
                State::Start => {
                    self.wire.start().map_err(Error::Bus)?;
                    State::Sending(0)
                }
                State::Sending(i) => {
                    let byte = match head.get(i) {
                        Some(byte) => Some(*byte),
                        None => body.get(i - head.len()).copied(),
                    };
                    match byte {
                        None => State::Stop,
                        Some(byte) => {
                            if self.wire.send_byte(byte).map_err(Error::Bus)? {
                                State::Sending(i + 1)
                            } else {
                                debug!("i2c: byte {} ({:#04x}) not acknowledged", i, byte);
                                State::Abort
                            }
                        }
                    }
                }
                State::Stop => {
                    self.wire.stop().map_err(Error::Bus)?;
                    State::Idle
                }
                State::Abort => {
                    self.wire.stop().map_err(Error::Bus)?;
                    return Err(Error::NoAck);
                }
            };
        }
    }
}

impl<L: LineDriver> Write for Engine<L> {
    type Error = Error<L::Error>;

    fn write(&mut self, addr: u8, output: &[u8]) -> Result<(), Self::Error> {
        // SAD + W
        let head = [addr << 1];
        self.guarded(|engine| engine.run(&head, output))
    }
}

impl<L: LineDriver> Read for Engine<L> {
    type Error = Error<L::Error>;

    fn read(&mut self, addr: u8, input: &mut [u8]) -> Result<(), Self::Error> {
        self.receive(addr, input)
    }
}
