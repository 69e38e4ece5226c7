//! GPIO pin abstractions
//!
//! The pin surface is number-indexed: the protocol stack asks for pins by
//! raw number (it gets them from user configuration), and [`PinId`] is the
//! validated form of that number that every other trait in this crate
//! speaks. Bounds are checked once at construction, so downstream code is
//! infallible.

/// Number of GPIO lines on the target SoC.
///
/// Sizes the interrupt dispatch table in `photon-core` and bounds [`PinId`].
pub const PIN_COUNT: usize = 40;

/// Validated GPIO line index in `[0, PIN_COUNT)`.
///
/// The platform convention reserves out-of-range values (e.g. 255 as a
/// "no pin" sentinel) to mean "never activate anything"; `new` refuses them
/// so they cannot reach a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(u8);

impl PinId {
    /// Validate a raw pin number.
    ///
    /// Returns `None` for numbers at or beyond [`PIN_COUNT`].
    pub const fn new(pin: u8) -> Option<Self> {
        if (pin as usize) < PIN_COUNT {
            Some(Self(pin))
        } else {
            None
        }
    }

    /// The raw pin number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// The pin number as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Pin I/O configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Input with internal pull-up
    InputPullUp,
    /// Input with internal pull-down
    InputPullDown,
    /// Push-pull output
    Output,
    /// Open-drain output
    OutputOpenDrain,
}

/// Digital logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl Level {
    /// Check if the level is high
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

/// Platform pin driver
///
/// Implementations forward to the vendor GPIO driver for the specific chip.
/// All methods are synchronous and task-context-only.
pub trait PinDriver {
    /// Error type for configuration operations
    type Error;

    /// Configure a pin's I/O mode
    ///
    /// A rejected configuration leaves the pin in its previous state.
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), Self::Error>;

    /// Drive an output pin to the given level
    fn write(&mut self, pin: PinId, level: Level);

    /// Read the current level of an input pin
    fn read(&self, pin: PinId) -> Level;
}
