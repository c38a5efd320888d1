//! Circuit validation.

use crate::error::{LogsimError, Result};

use super::Circuit;

/// Validate a circuit for simulation.
///
/// Checks:
/// - Every input is driven by some output
/// - At least one output is monitored
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    let unconnected = circuit.network.unconnected_inputs();
    if !unconnected.is_empty() {
        return Err(LogsimError::UnconnectedInputs {
            pins: unconnected
                .into_iter()
                .map(|pin| circuit.signal_name(pin))
                .collect(),
        });
    }

    if circuit.monitors.is_empty() {
        return Err(LogsimError::NoMonitors);
    }

    Ok(())
}
