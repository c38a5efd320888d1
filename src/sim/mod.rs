//! Simulation driver and trace output.
//!
//! [`Simulator`] owns a parsed [`Circuit`](crate::circuit::Circuit) and runs
//! it cycle by cycle, recording every monitored output. The recorded traces
//! can be drawn as text waveforms ([`waveform`]) or exported as a value
//! change dump ([`vcd`]).

mod simulator;
pub mod vcd;
pub mod waveform;

pub use simulator::{Simulator, SimulatorConfig};
