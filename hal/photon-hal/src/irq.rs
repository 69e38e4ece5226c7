//! Pin interrupt controller abstractions
//!
//! The dispatch table in `photon-core` drives the hardware through this
//! trait. Implementations forward to the vendor interrupt driver; the
//! chip crate is also responsible for routing its interrupt vectors into
//! the table's dispatch entry point.

use crate::gpio::PinId;

/// Edge or level condition that fires a pin interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Low-to-high transition
    RisingEdge,
    /// High-to-low transition
    FallingEdge,
    /// Any transition
    BothEdges,
    /// Level held high
    LevelHigh,
    /// Level held low
    LevelLow,
}

/// Outcome of installing the shared interrupt dispatch service
///
/// Installation is idempotent from the caller's point of view: a service
/// that some other subsystem already installed is just as usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceInstall {
    /// Service installed by this call
    Installed,
    /// Service was already running
    AlreadyInstalled,
}

/// Platform interrupt controller
///
/// All methods are synchronous and task-context-only. Pin arguments are
/// pre-validated [`PinId`]s, so implementations never see an out-of-range
/// index.
pub trait InterruptController {
    /// Error type for service installation
    type Error;

    /// Install the chip's shared pin-interrupt service
    ///
    /// Called once before the first pin is attached. Reporting
    /// [`ServiceInstall::AlreadyInstalled`] is success; any `Err` is fatal
    /// to the attach that triggered the install.
    fn install_service(&mut self) -> Result<ServiceInstall, Self::Error>;

    /// Arm a pin's interrupt with the given trigger condition
    fn set_trigger(&mut self, pin: PinId, trigger: Trigger);

    /// Allow the pin's trigger to wake the chip from sleep
    fn enable_wake(&mut self, pin: PinId, trigger: Trigger);

    /// Stop the pin from waking the chip
    fn disable_wake(&mut self, pin: PinId);

    /// Route the pin's hardware interrupt line into the dispatch service
    fn register_isr(&mut self, pin: PinId);

    /// Remove the pin's routing and disarm its trigger
    fn unregister_isr(&mut self, pin: PinId);

    /// Unmask interrupt delivery for the pin
    fn enable(&mut self, pin: PinId);

    /// Mask interrupt delivery for the pin
    fn disable(&mut self, pin: PinId);

    /// Force the pin's input buffer on
    ///
    /// Pins whose output stage is routed to a peripheral suppress input
    /// sensing unless the input buffer is explicitly enabled.
    fn enable_input_buffer(&mut self, pin: PinId);
}
