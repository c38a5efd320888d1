//! Logic network representation and simulation kernel.
//!
//! This module holds the device model ([`Devices`]), the wiring and cycle
//! evaluator ([`Network`]) and the signal-trace recorder ([`Monitors`]),
//! bundled together as a [`Circuit`] once a definition file is parsed.

mod devices;
mod graph;
mod monitors;
mod network;
mod types;
mod validate;

pub use devices::{Device, DeviceKind, Devices, Input, Output, PinNames, MAX_GATE_INPUTS};
pub use graph::Circuit;
pub use monitors::{Monitors, Trace};
pub use network::{Network, DEFAULT_SETTLE_MARGIN};
pub use types::*;
pub use validate::validate_circuit;
