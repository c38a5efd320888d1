//! Error types for the logic simulator.
//!
//! Each collaborator operation has its own error enum so that callers, the
//! parser in particular, can match on exactly what went wrong. The
//! `#[error]` strings double as the user-facing messages in parse reports.
//! [`LogsimError`] unifies everything a driver (CLI, WASM) can run into.

use thiserror::Error;

use crate::circuit::DeviceType;

/// Result type alias using [`LogsimError`].
pub type Result<T> = std::result::Result<T, LogsimError>;

/// Failure to declare or update a device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Already used as a name for another device.")]
    DuplicateName,

    #[error("Expected a property for the device.")]
    MissingConfiguration { kind: DeviceType },

    #[error("Property not recognised for device.{}", configuration_hint(.kind))]
    InvalidConfiguration { kind: DeviceType },

    #[error("Property not required for this device.")]
    UnexpectedConfiguration { kind: DeviceType },

    #[error("This does not match a known device.")]
    UnknownDevice,

    #[error("This device is not a switch.")]
    NotASwitch,
}

fn configuration_hint(kind: &DeviceType) -> &'static str {
    match kind {
        DeviceType::Switch => " Make sure property is either 'OFF' or 'ON'.",
        DeviceType::Clock => " Make sure property is a positive integer.",
        DeviceType::SigGen => " Make sure property contains only '0's and '1's.",
        DeviceType::And | DeviceType::Nand | DeviceType::Or | DeviceType::Nor => {
            " Make sure property is an integer less than 17 (and greater than 0)."
        }
        DeviceType::Xor | DeviceType::DType => "",
    }
}

/// Failure to wire an output to an input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("The input is already connected elsewhere.")]
    InputIsAlreadyDriven,

    /// The driven end of the connection is an output.
    #[error("Cannot connect an output to an output.")]
    EndpointIsNotAnInput,

    /// The driving end of the connection is an input.
    #[error("Cannot connect an input to an input.")]
    EndpointIsNotAnOutput,

    #[error("One of the devices does not exist in network.")]
    UnknownDevice,

    #[error("One of the ports does not exist.")]
    UnknownPin,
}

/// Failure to register a monitor point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("This point cannot be monitored as it is not an output.")]
    NotAnOutput,

    #[error("This point is already being monitored.")]
    AlreadyMonitored,

    #[error("This does not match a known device.")]
    UnknownDevice,
}

/// A cycle failed to settle to a stable state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Network oscillating: no stable state after {passes} propagation passes")]
pub struct OscillationError {
    pub passes: usize,
}

/// Unified error type for driver-level operations.
#[derive(Error, Debug)]
pub enum LogsimError {
    // ============ Definition File Errors ============
    /// The definition file has syntax or semantic errors.
    #[error("Parsing complete. Unable to build network. {count} error(s) found:\n{report}")]
    ParseFailed { count: usize, report: String },

    /// Error reading the definition file
    #[error("Failed to read definition file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ Circuit Errors ============
    #[error("Not all inputs are connected: {}", .pins.join(", "))]
    UnconnectedInputs { pins: Vec<String> },

    #[error("No monitor points chosen. At least one output must be monitored.")]
    NoMonitors,

    #[error("Unknown signal '{name}'")]
    UnknownSignal { name: String },

    #[error("Device '{name}': {source}")]
    Device {
        name: String,
        #[source]
        source: DeviceError,
    },

    #[error("Signal '{name}': {source}")]
    Monitor {
        name: String,
        #[source]
        source: MonitorError,
    },

    // ============ Simulation Errors ============
    #[error("Simulation stopped at cycle {cycle}: {source}")]
    Oscillation {
        cycle: usize,
        #[source]
        source: OscillationError,
    },

    #[error("Nothing to continue: run the simulation first")]
    NothingToContinue,

    // ============ Output Errors ============
    #[error("Failed to write trace output: {source}")]
    TraceWriteError {
        #[from]
        source: std::io::Error,
    },
}

impl LogsimError {
    /// Create an unknown signal error
    pub fn unknown_signal(name: impl Into<String>) -> Self {
        Self::UnknownSignal { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_hint() {
        let err = DeviceError::InvalidConfiguration {
            kind: DeviceType::Clock,
        };
        assert_eq!(
            err.to_string(),
            "Property not recognised for device. Make sure property is a positive integer."
        );
        let err = DeviceError::InvalidConfiguration {
            kind: DeviceType::Xor,
        };
        assert_eq!(err.to_string(), "Property not recognised for device.");
    }

    #[test]
    fn test_unconnected_inputs_message() {
        let err = LogsimError::UnconnectedInputs {
            pins: vec!["g1.2".to_string(), "d1.CLK".to_string()],
        };
        assert_eq!(err.to_string(), "Not all inputs are connected: g1.2, d1.CLK");
    }
}
