//! Hardware collaborators for the feeder core.
//!
//! The simulator and host wall clock are always available. Raspberry Pi
//! drivers (HX711 scale, servo gate, buttons) need the `hardware` feature.

pub mod clock;
pub mod error;
pub mod sim;
pub mod util;

#[cfg(feature = "hardware")]
pub mod hardware;
#[cfg(feature = "hardware")]
pub mod hx711;

pub use clock::SystemWallClock;
pub use error::HwError;
pub use sim::{SimulatedGate, SimulatedScale};
