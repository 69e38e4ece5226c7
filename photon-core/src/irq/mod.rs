//! Pin interrupt dispatch
//!
//! A fixed table, one slot per GPIO line, routing hardware pin interrupts
//! to user handlers. Task context populates slots through [`InterruptMux::attach`]
//! and [`InterruptMux::detach`]; the chip crate's interrupt trampoline calls
//! [`InterruptMux::dispatch`] with the firing pin.
//!
//! Slots are the unit of mutation. A slot holds at most one handler;
//! attaching over an occupied slot displaces the previous handler outright,
//! releasing its managed context if it had one. There is no chaining of
//! handlers per pin.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use photon_hal::gpio::{PinId, PIN_COUNT};
use photon_hal::irq::{InterruptController, Trigger};

mod handler;

pub use handler::{IsrContext, IsrHandler, ManagedCtx, ReleaseHook};

use handler::Invoke;

struct Inner {
    slots: [Option<IsrHandler>; PIN_COUNT],
    /// Shared interrupt service installed on the controller
    service_installed: bool,
}

/// Pin-indexed interrupt dispatch table
///
/// `const`-constructible; boards keep one instance in a `static`. All slot
/// state sits behind a critical-section mutex, so task-context mutation and
/// the interrupt-context dispatch path serialize against each other and an
/// interrupt can never observe a half-written slot.
pub struct InterruptMux {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner>>,
}

impl Default for InterruptMux {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptMux {
    /// Create a table with every slot empty
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                slots: [const { None }; PIN_COUNT],
                service_installed: false,
            })),
        }
    }

    /// Attach a handler to a pin
    ///
    /// Out-of-range pins are a defined no-op: the platform's "no pin"
    /// sentinel must never activate anything. On first use the shared
    /// interrupt service is installed; a service someone else already
    /// installed counts as success, any other driver error is fatal to this
    /// pin and leaves its slot untouched.
    ///
    /// A handler already occupying the slot is displaced, and its managed
    /// context (if any) is released through its cleanup hook after the slot
    /// lock is dropped. The new handler and context land as a single slot
    /// write. The trigger is armed, wake-from-sleep optionally enabled, and
    /// the pin's input buffer forced on.
    ///
    /// Task context only: this touches the interrupt controller and must
    /// not run inside an ISR.
    pub fn attach<C: InterruptController>(
        &self,
        ctl: &mut C,
        pin: u8,
        handler: IsrHandler,
        trigger: Trigger,
        wake: bool,
    ) -> Result<(), C::Error> {
        let Some(pin) = PinId::new(pin) else {
            return Ok(());
        };

        let displaced = self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            if !inner.service_installed {
                match ctl.install_service() {
                    // AlreadyInstalled is success: the service is usable
                    Ok(_) => inner.service_installed = true,
                    Err(err) => {
                        #[cfg(feature = "defmt")]
                        defmt::error!("pin {} interrupt service failed to start", pin.number());
                        return Err(err);
                    }
                }
            }

            let displaced = inner.slots[pin.index()].replace(handler);

            ctl.set_trigger(pin, trigger);
            if wake {
                ctl.enable_wake(pin, trigger);
            }
            ctl.register_isr(pin);
            ctl.enable_input_buffer(pin);

            Ok(displaced)
        })?;

        // Runs the displaced managed context's cleanup hook, if any, outside
        // the slot lock.
        drop(displaced);
        Ok(())
    }

    /// Detach whatever handler a pin has
    ///
    /// Removes the ISR routing, disables wake, and clears the slot,
    /// releasing a managed context if one was stored. Safe to call on a pin
    /// with nothing attached and on an out-of-range pin. Task context only.
    pub fn detach<C: InterruptController>(&self, ctl: &mut C, pin: u8) {
        let Some(pin) = PinId::new(pin) else {
            return;
        };

        let removed = self.inner.lock(|inner| {
            ctl.unregister_isr(pin);
            ctl.disable_wake(pin);
            inner.borrow_mut().slots[pin.index()].take()
        });

        drop(removed);
    }

    /// Unmask interrupt delivery for a pin
    ///
    /// The stored handler and context are untouched; this only reverses
    /// [`InterruptMux::disable`].
    pub fn enable<C: InterruptController>(&self, ctl: &mut C, pin: u8) {
        if let Some(pin) = PinId::new(pin) {
            ctl.enable(pin);
        }
    }

    /// Mask interrupt delivery for a pin without touching its slot
    ///
    /// Used to temporarily mute a source, e.g. around a re-attach while the
    /// trigger is imminent.
    pub fn disable<C: InterruptController>(&self, ctl: &mut C, pin: u8) {
        if let Some(pin) = PinId::new(pin) {
            ctl.disable(pin);
        }
    }

    /// Check if a pin currently has a handler
    pub fn is_attached(&self, pin: u8) -> bool {
        match PinId::new(pin) {
            Some(pin) => self
                .inner
                .lock(|inner| inner.borrow().slots[pin.index()].is_some()),
            None => false,
        }
    }

    /// Interrupt-context entry point
    ///
    /// Called by the chip crate's trampoline with the firing pin. Copies
    /// the slot's invocation out under the critical section and runs the
    /// handler after releasing it. Empty slot: does nothing. Never blocks
    /// beyond the critical section, never allocates, never logs.
    ///
    /// Bounds were enforced when the handler was attached; a `PinId` cannot
    /// index outside the table.
    pub fn dispatch(&self, pin: PinId) {
        let invoke = self
            .inner
            .lock(|inner| inner.borrow().slots[pin.index()].as_ref().map(IsrHandler::invoke));

        match invoke {
            Some(Invoke::Plain(hook)) => hook(),
            Some(Invoke::Bound { hook, token }) => hook(token),
            None => {}
        }
    }
}
