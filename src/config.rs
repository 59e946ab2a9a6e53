//! Bus timing configuration

/// Settle units between edges when nothing else is configured
pub const DEFAULT_SETTLE_UNITS: u32 = 1;

/// Engine configuration
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Delay units waited after every edge
    ///
    /// With [`HalLines`](crate::line::HalLines) one unit is one timer
    /// period, so the bit rate is roughly `timer rate / (3 * settle_units)`.
    /// Tune it to the slave's timing budget.
    pub settle_units: u32,
}

impl Config {
    pub const fn new(settle_units: u32) -> Self {
        Config { settle_units }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_SETTLE_UNITS)
    }
}
