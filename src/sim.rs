//! Simulated open-drain bus with a single slave, for host tests
//!
//! DATA is a wired-AND of the master's line and the slave's pull-down. The
//! slave watches CLOCK edges: it shifts bits in on rising edges, pulls DATA
//! low for the ACK pulse, and when addressed for reading shifts its reply
//! out MSB first. Read mode needs a configured reply; without one every
//! byte is taken as written, whatever its R/W bit.

use std::vec::Vec;

use crate::line::{Direction, Line, LineDriver, SignalLine};

/// Something observed on the wire
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Event {
    /// DATA fell while CLOCK was high
    Start,
    /// DATA rose while CLOCK was high
    Stop,
    /// CLOCK rose, DATA had this level
    Sample(bool),
    /// Master switched DATA to input
    DataInput,
    /// Master switched DATA to output
    DataOutput,
}

#[derive(Debug, Default)]
pub struct SimSlave {
    nack_at: Option<usize>,
    reply: Vec<u8>,
    /// Every byte the master clocked out, in order
    pub received: Vec<u8>,
    /// Master ACK (true) / NACK (false) per byte read
    pub master_acks: Vec<bool>,
    active: bool,
    reading: bool,
    read_requested: bool,
    done: bool,
    bit: u8,
    shift: u8,
    sent: usize,
    pull_low: bool,
}

impl SimSlave {
    fn on_start(&mut self) {
        self.active = true;
        self.reading = false;
        self.read_requested = false;
        self.done = false;
        self.bit = 0;
        self.shift = 0;
        self.pull_low = false;
    }

    fn on_stop(&mut self) {
        self.active = false;
        self.pull_low = false;
    }

    fn on_rise(&mut self, level: bool) {
        if !self.active {
            return;
        }
        if self.bit < 8 {
            if !self.reading {
                self.shift = (self.shift << 1) | level as u8;
            }
            self.bit += 1;
        } else if self.bit == 8 {
            if self.reading {
                self.master_acks.push(!level);
                self.done = level;
            }
            self.bit = 9;
        }
    }

    fn on_fall(&mut self) {
        if !self.active {
            return;
        }
        match self.bit {
            8 => {
                if self.reading {
                    // let the master drive its ACK
                    self.pull_low = false;
                } else {
                    let index = self.received.len();
                    self.received.push(self.shift);
                    if index == 0 && self.shift & 1 == 1 && !self.reply.is_empty() {
                        self.read_requested = true;
                    }
                    self.pull_low = self.nack_at != Some(index);
                }
            }
            9 => {
                self.pull_low = false;
                self.bit = 0;
                self.shift = 0;
                if self.reading {
                    self.sent += 1;
                } else if self.read_requested {
                    self.reading = true;
                }
                self.present();
            }
            _ => self.present(),
        }
    }

    // Put the next reply bit on DATA.
    fn present(&mut self) {
        if !self.reading || self.done || self.bit >= 8 {
            return;
        }
        let byte = self.reply.get(self.sent).copied().unwrap_or(0xFF);
        self.pull_low = (byte >> (7 - self.bit)) & 1 == 0;
    }
}

pub struct SimBus {
    pub clock: SignalLine,
    pub data: SignalLine,
    pub events: Vec<Event>,
    pub clock_edges: usize,
    pub delay_units: u32,
    pub slave: SimSlave,
}

impl SimBus {
    /// Idle bus with a slave that ACKs everything
    pub fn new() -> Self {
        SimBus {
            clock: SignalLine::idle(Line::Clock),
            data: SignalLine::idle(Line::Data),
            events: Vec::new(),
            clock_edges: 0,
            delay_units: 0,
            slave: SimSlave::default(),
        }
    }

    /// Slave NACKs the byte at `index`.
    pub fn nack_at(mut self, index: usize) -> Self {
        self.slave.nack_at = Some(index);
        self
    }

    /// Bytes the slave returns when read.
    pub fn reply(mut self, bytes: &[u8]) -> Self {
        self.slave.reply = bytes.to_vec();
        self
    }

    /// DATA levels seen on every CLOCK rising edge
    pub fn samples(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Sample(level) => Some(*level),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: Event) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }

    pub fn is_idle(&self) -> bool {
        self.clock.is_idle() && self.data.is_idle()
    }

    fn clock_high(&self) -> bool {
        self.clock.direction == Direction::Input || self.clock.high
    }

    fn data_high(&self) -> bool {
        let master = self.data.direction == Direction::Input || self.data.high;
        master && !self.slave.pull_low
    }

    fn update(&mut self, line: Line, change: impl FnOnce(&mut SignalLine)) {
        let clock_before = self.clock_high();
        let data_before = self.data_high();

        match line {
            Line::Clock => change(&mut self.clock),
            Line::Data => change(&mut self.data),
        }

        let clock_after = self.clock_high();
        if clock_before != clock_after {
            self.clock_edges += 1;
            if clock_after {
                let level = self.data_high();
                self.events.push(Event::Sample(level));
                self.slave.on_rise(level);
            } else {
                self.slave.on_fall();
            }
            return;
        }

        let data_after = self.data_high();
        if clock_after && data_before && !data_after {
            self.events.push(Event::Start);
            self.slave.on_start();
        } else if clock_after && !data_before && data_after {
            self.events.push(Event::Stop);
            self.slave.on_stop();
        }
    }
}

impl LineDriver for SimBus {
    type Error = core::convert::Infallible;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error> {
        if line == Line::Data && self.data.direction != direction {
            self.events.push(match direction {
                Direction::Input => Event::DataInput,
                Direction::Output => Event::DataOutput,
            });
        }
        self.update(line, |state| state.direction = direction);
        Ok(())
    }

    fn set_level(&mut self, line: Line, high: bool) -> Result<(), Self::Error> {
        self.update(line, |state| state.high = high);
        Ok(())
    }

    fn read_level(&mut self, line: Line) -> Result<bool, Self::Error> {
        Ok(match line {
            Line::Clock => self.clock_high(),
            Line::Data => self.data_high(),
        })
    }

    fn delay(&mut self, units: u32) {
        self.delay_units += units;
    }
}
