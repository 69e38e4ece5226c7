//! Photon Hardware Abstraction Layer
//!
//! This crate defines the trait seams between the board-agnostic hardware
//! services in `photon-core` and chip-specific driver crates. The IR
//! protocol stack only ever sees these traits, so the same code runs on
//! any supported target.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  IR protocol stack / application        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  photon-core (dispatch, notification)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  photon-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  chip vendor driver crate               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::PinDriver`] - Pin configuration and digital I/O
//! - [`irq::InterruptController`] - Pin interrupt machinery
//! - [`time::MonotonicClock`] - Elapsed-time queries and busy-wait delays

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod irq;
pub mod time;

// Re-export key types at crate root for convenience
pub use gpio::{Level, PinDriver, PinId, PinMode, PIN_COUNT};
pub use irq::{InterruptController, ServiceInstall, Trigger};
pub use time::MonotonicClock;
