//! # Logsim Core
//!
//! A compiler and cycle simulator for digital logic networks.
//!
//! This library provides:
//! - A small definition language for declaring devices, wiring and monitor points
//! - A lexer and recursive-descent parser that report every error in one pass
//! - A cycle-based simulation kernel for gates, D-type flip-flops, clocks,
//!   switches and signal generators
//! - Signal traces rendered as text waveforms or exported as VCD
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`names`] - Symbol table shared by the lexer and the device model
//! - [`dsl`] - Lexer, parser and error report for the definition language
//! - [`circuit`] - Device model, connection graph and signal-trace recorder
//! - [`sim`] - Simulation driver and trace output
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! logsim circuit.def -n 20 --switch sw1=1
//! ```
//!
//! ### Library
//!
//! ```
//! use logsim_core::{dsl, sim::waveform, Simulator};
//!
//! let circuit = dsl::load(
//!     "DEVICE_LIST: SWITCH sw OFF; CLOCK clk 1; AND g 2; END
//!      CONNECTION_LIST: sw -> g.1; clk -> g.2; END
//!      MONITOR_LIST: g; END",
//! )?;
//! let mut sim = Simulator::new(circuit);
//! sim.set_switch("sw", true)?;
//! sim.run(4)?;
//! assert_eq!(waveform::render(&sim), "g : ‾\\/\\\n");
//! # Ok::<(), logsim_core::LogsimError>(())
//! ```
//!
//! ## Simulation Method
//!
//! Each cycle first steps the sources (switches, clocks, signal generators),
//! then repeatedly re-evaluates every gate and flip-flop in declaration order
//! until a full pass changes nothing. Every output is classified against the
//! previous cycle's stable value as low, high, rising or falling. A network
//! that fails to settle within one pass per device plus a small margin is
//! reported as oscillating and the cycle is rolled back.

pub mod circuit;
pub mod dsl;
pub mod error;
pub mod names;
pub mod sim;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{LogsimError, Result};
pub use sim::Simulator;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmLogicSim;
