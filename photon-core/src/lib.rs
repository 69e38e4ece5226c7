//! Board-agnostic hardware services for the Photon IR firmware
//!
//! This crate contains the shared machinery that sits between the IR
//! protocol stack and the chip driver crates:
//!
//! - Bus-clock change notification (subsystems rescale their timing when
//!   the clock manager retunes the CPU/peripheral clock)
//! - Pin interrupt dispatch (one handler slot per GPIO line, populated
//!   from task context, invoked from interrupt context)
//!
//! Both services are `const`-constructible so boards place them in
//! `static`s; all shared state lives behind critical-section mutexes.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod clock;
pub mod irq;
