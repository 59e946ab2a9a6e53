//! This is a [bit banging] I2C master, driving an SAA1064 LED controller
//! over two GPIO lines.
//!
//! [bit banging]: https://en.wikipedia.org/wiki/Bit_banging
//!
//! The layers, from the wire up:
//!
//! - [`line`]: CLOCK and DATA behind the [`LineDriver`] trait, with an
//!   [`embedded-hal`] implementation in [`HalLines`]
//! - [`transfer`]: bit and byte primitives, ACK sampling
//! - [`i2c`]: the transaction engine, START / bytes / STOP with abort on NACK
//! - [`display`]: the keypad-driven SAA1064 application on top
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod display;
pub mod i2c;
pub mod line;
pub mod transaction;
pub mod transfer;

#[cfg(test)]
mod sim;

pub use config::Config;
pub use i2c::{Engine, Error};
pub use line::{Direction, HalLines, Line, LineDriver, SignalLine};
pub use transaction::{Outcome, Transaction};
