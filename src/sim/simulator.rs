//! Main simulator interface.

use log::{info, warn};

use crate::circuit::{Circuit, Signal, DEFAULT_SETTLE_MARGIN};
use crate::error::{LogsimError, Result};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Settle passes allowed per cycle on top of one per device before the
    /// network is declared oscillating.
    pub settle_margin: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            settle_margin: DEFAULT_SETTLE_MARGIN,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extra settle passes allowed per cycle.
    pub fn with_settle_margin(mut self, settle_margin: usize) -> Self {
        self.settle_margin = settle_margin;
        self
    }
}

/// The cycle simulator.
pub struct Simulator {
    /// The circuit being simulated
    circuit: Circuit,
    /// Cycles completed since the last cold start
    cycles_completed: usize,
}

impl Simulator {
    /// Create a new simulator for the given circuit with default configuration.
    pub fn new(circuit: Circuit) -> Self {
        Self::with_config(circuit, SimulatorConfig::default())
    }

    /// Create a new simulator for the given circuit with custom configuration.
    pub fn with_config(mut circuit: Circuit, config: SimulatorConfig) -> Self {
        circuit.network.set_settle_margin(config.settle_margin);
        Self {
            circuit,
            cycles_completed: 0,
        }
    }

    /// Cold start the network, clear the traces and run `cycles` cycles.
    pub fn run(&mut self, cycles: usize) -> Result<()> {
        self.circuit.cold_start();
        self.cycles_completed = 0;
        info!("Running for {} cycles", cycles);
        self.run_cycles(cycles)
    }

    /// Run `cycles` more cycles from the current state.
    pub fn continue_run(&mut self, cycles: usize) -> Result<()> {
        if self.cycles_completed == 0 {
            return Err(LogsimError::NothingToContinue);
        }
        info!(
            "Continuing for {} cycles. Total: {}",
            cycles,
            self.cycles_completed + cycles
        );
        self.run_cycles(cycles)
    }

    fn run_cycles(&mut self, cycles: usize) -> Result<()> {
        for _ in 0..cycles {
            if let Err(source) = self.circuit.network.advance_cycle() {
                let cycle = self.cycles_completed + 1;
                warn!("Network oscillating at cycle {}", cycle);
                return Err(LogsimError::Oscillation { cycle, source });
            }
            self.circuit.record_cycle();
            self.cycles_completed += 1;
        }
        Ok(())
    }

    /// Set the switch `name`. The new value shows from the next cycle on.
    pub fn set_switch(&mut self, name: &str, on: bool) -> Result<()> {
        let id = self
            .circuit
            .device_ref(name)
            .ok_or_else(|| LogsimError::unknown_signal(name))?;
        self.circuit
            .network
            .devices_mut()
            .set_switch(id, on)
            .map_err(|source| LogsimError::Device {
                name: name.to_string(),
                source,
            })?;
        info!("Switch {} set to {}", name, u8::from(on));
        Ok(())
    }

    /// Start monitoring the output `name` (`dev` or `dev.PIN`). Cycles already
    /// run show as blank.
    pub fn monitor(&mut self, name: &str) -> Result<()> {
        let point = self
            .circuit
            .signal_ref(name)
            .ok_or_else(|| LogsimError::unknown_signal(name))?;
        self.circuit
            .monitor(point)
            .map_err(|source| LogsimError::Monitor {
                name: name.to_string(),
                source,
            })?;
        self.circuit.monitors.fill_blank(point, self.cycles_completed);
        Ok(())
    }

    /// Stop monitoring the output `name`. False if it was not monitored.
    pub fn unmonitor(&mut self, name: &str) -> Result<bool> {
        let point = self
            .circuit
            .signal_ref(name)
            .ok_or_else(|| LogsimError::unknown_signal(name))?;
        Ok(self.circuit.monitors.unmonitor(point))
    }

    /// Cycles completed since the last [`run`](Self::run).
    pub fn cycles_completed(&self) -> usize {
        self.cycles_completed
    }

    /// Every monitored signal name with its trace, in monitoring order.
    pub fn traces(&self) -> Vec<(String, &[Signal])> {
        self.circuit
            .monitors
            .iter()
            .map(|trace| (self.circuit.signal_name(trace.point), trace.signals.as_slice()))
            .collect()
    }

    /// Trace of the monitored output `name`.
    pub fn trace(&self, name: &str) -> Option<&[Signal]> {
        self.circuit.monitors.trace(self.circuit.signal_ref(name)?)
    }

    /// Get a reference to the circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }
}
