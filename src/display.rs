//! Keypad-driven SAA1064 four-digit LED display
//!
//! Every key press shifts the shown digits one place to the right and puts
//! the new symbol in the leftmost digit, then sends the whole frame in one
//! transaction. A failed transaction toggles the error LED; nothing is
//! retried.

use embedded_hal::digital::v2::ToggleableOutputPin;
use log::warn;

use crate::i2c::Engine;
use crate::line::LineDriver;
use crate::transaction::Transaction;

/// SAA1064 write address, already shifted with the R/W bit clear
pub const SAA1064_ADDR: u8 = 0x76;

/// Instruction byte: start at the control register
pub const SUBADDRESS: u8 = 0x00;

/// Control register: dynamic mode, all digits on, 12 mA segment current
pub const CONTROL: u8 = 0x37;

/// Bytes in a display frame
pub const FRAME_LEN: usize = 7;

/// Segment pattern of a blank digit
pub const BLANK: u8 = 0x00;

/// Symbol produced by the 4x4 keypad scanner
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    One,
    Two,
    Three,
    A,
    Four,
    Five,
    Six,
    B,
    Seven,
    Eight,
    Nine,
    C,
    Star,
    Zero,
    Hash,
    D,
}

// Row-major, as printed on the keypad.
const LAYOUT: [[Key; 4]; 4] = [
    [Key::One, Key::Two, Key::Three, Key::A],
    [Key::Four, Key::Five, Key::Six, Key::B],
    [Key::Seven, Key::Eight, Key::Nine, Key::C],
    [Key::Star, Key::Zero, Key::Hash, Key::D],
];

impl Key {
    /// Key at `row`, `col` of the keypad as printed, both counted from zero
    pub fn from_position(row: usize, col: usize) -> Option<Key> {
        LAYOUT.get(row)?.get(col).copied()
    }

    /// Key found by the scanner with demux line `strobe` driven and input
    /// `column` reading low
    ///
    /// The demux strobes follow the printed columns and the inputs the
    /// printed rows, so the lookup is transposed.
    pub fn from_scan(strobe: usize, column: usize) -> Option<Key> {
        Key::from_position(column, strobe)
    }

    /// Seven-segment pattern for this key on the SAA1064 outputs
    pub fn segments(self) -> u8 {
        match self {
            Key::One => 0x30,
            Key::Two => 0x6D,
            Key::Three => 0x79,
            Key::A => 0x77,
            Key::Four => 0x33,
            Key::Five => 0x5B,
            Key::Six => 0x5F,
            Key::B => 0x1F,
            Key::Seven => 0x70,
            Key::Eight => 0x7F,
            Key::Nine => 0x7B,
            Key::C => 0x4E,
            Key::Star => 0x47,
            Key::Zero => 0x7E,
            Key::Hash => 0x4F,
            Key::D => 0x3D,
        }
    }
}

/// Four digits shown on an SAA1064, leftmost first
pub struct KeypadDisplay<L, LED>
where
    L: LineDriver,
    LED: ToggleableOutputPin,
{
    engine: Engine<L>,
    error_led: LED,
    digits: [u8; 4],
}

impl<L, LED> KeypadDisplay<L, LED>
where
    L: LineDriver,
    LED: ToggleableOutputPin,
{
    /// Create instance with all digits blank
    pub fn new(engine: Engine<L>, error_led: LED) -> Self {
        KeypadDisplay {
            engine,
            error_led,
            digits: [BLANK; 4],
        }
    }

    pub fn digits(&self) -> [u8; 4] {
        self.digits
    }

    pub fn engine(&self) -> &Engine<L> {
        &self.engine
    }

    pub fn destroy(self) -> (Engine<L>, LED) {
        (self.engine, self.error_led)
    }

    /// Bytes for the current digits, in wire order
    pub fn frame(&self) -> [u8; FRAME_LEN] {
        let [d1, d2, d3, d4] = self.digits;
        [SAA1064_ADDR, SUBADDRESS, CONTROL, d1, d2, d3, d4]
    }

    /// Shift `key` in from the left and update the display.
    ///
    /// Returns whether the display acknowledged the frame.
    pub fn press(&mut self, key: Key) -> Result<bool, LED::Error> {
        self.digits.copy_within(0..3, 1);
        self.digits[0] = key.segments();
        self.show()
    }

    /// Blank every digit and update the display.
    pub fn clear(&mut self) -> Result<bool, LED::Error> {
        self.digits = [BLANK; 4];
        self.show()
    }

    fn show(&mut self) -> Result<bool, LED::Error> {
        let frame = self.frame();
        let mut transaction = Transaction::new(&frame);
        let success = self.engine.execute(&mut transaction);
        if !success {
            warn!("display: frame not acknowledged");
            self.error_led.toggle()?;
        }
        Ok(success)
    }
}
