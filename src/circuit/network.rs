//! Connection graph and cycle evaluator.
//!
//! Connections are stored on the driven input. One call to
//! [`Network::advance_cycle`] performs a full simulation cycle:
//!
//! 1. the level of every output is snapshotted as the previous stable state;
//! 2. sources (switches, clocks, signal generators) step once;
//! 3. gates and flip-flops are re-evaluated in declaration order, pass after
//!    pass, until a pass changes nothing. A flip-flop sees a clock edge when
//!    its CLK driver was low in the previous stable state and reads high now.
//!
//! Every output written during a cycle is classified against its snapshot
//! level, so a level change shows up as [`Signal::Rising`] or
//! [`Signal::Falling`] for exactly one cycle. If the passes do not settle
//! within `device_count + settle_margin` the whole device state is restored
//! and the cycle fails with [`OscillationError`].

use log::{debug, trace};

use super::devices::{DeviceKind, Devices, DTYPE_CLEAR, DTYPE_CLK, DTYPE_DATA, DTYPE_SET};
use super::types::{DeviceId, PinRef, Signal};
use crate::error::{ConnectionError, OscillationError};

/// Extra settle passes allowed on top of one pass per device.
pub const DEFAULT_SETTLE_MARGIN: usize = 2;

/// The previous stable state every settle pass is computed from.
struct Stable {
    /// Output levels, indexed by device then output.
    levels: Vec<Vec<Option<bool>>>,
    /// Stored bit of each D-type, `None` for other devices.
    stored: Vec<Option<bool>>,
}

/// New output levels computed for one device.
struct Evaluation {
    stored: Option<bool>,
    outputs: Vec<bool>,
}

/// The device model plus the wiring between devices.
#[derive(Debug, Clone)]
pub struct Network {
    devices: Devices,
    settle_margin: usize,
}

impl Network {
    /// Create an unwired network over `devices`.
    pub fn new(devices: Devices) -> Self {
        Self {
            devices,
            settle_margin: DEFAULT_SETTLE_MARGIN,
        }
    }

    pub fn devices(&self) -> &Devices {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Devices {
        &mut self.devices
    }

    /// Set the number of settle passes allowed beyond one per device.
    pub fn set_settle_margin(&mut self, margin: usize) {
        self.settle_margin = margin;
    }

    /// Maximum settle passes per cycle before declaring oscillation.
    pub fn settle_limit(&self) -> usize {
        self.devices.len() + self.settle_margin
    }

    /// Wire `output` to drive `input`.
    pub fn connect(&mut self, input: PinRef, output: PinRef) -> Result<(), ConnectionError> {
        let source = self
            .devices
            .get(output.device)
            .ok_or(ConnectionError::UnknownDevice)?;
        let target = self
            .devices
            .get(input.device)
            .ok_or(ConnectionError::UnknownDevice)?;

        let Some(index) = target.input_index(input.pin) else {
            return Err(if target.output_index(input.pin).is_some() {
                ConnectionError::EndpointIsNotAnInput
            } else {
                ConnectionError::UnknownPin
            });
        };
        if source.output_index(output.pin).is_none() {
            return Err(if source.input_index(output.pin).is_some() {
                ConnectionError::EndpointIsNotAnOutput
            } else {
                ConnectionError::UnknownPin
            });
        }
        if target.inputs[index].driver.is_some() {
            return Err(ConnectionError::InputIsAlreadyDriven);
        }

        if let Some(target) = self.devices.get_mut(input.device) {
            target.inputs[index].driver = Some(output);
        }
        debug!("connected {:?} -> {:?}", output, input);
        Ok(())
    }

    /// True iff every input of every device is driven.
    pub fn validate_fully_wired(&self) -> bool {
        self.devices
            .iter()
            .all(|(_, device)| device.inputs.iter().all(|input| input.driver.is_some()))
    }

    /// All inputs with no driver, in declaration order.
    pub fn unconnected_inputs(&self) -> Vec<PinRef> {
        self.devices
            .iter()
            .flat_map(|(id, device)| {
                device
                    .inputs
                    .iter()
                    .filter(|input| input.driver.is_none())
                    .map(move |input| PinRef::named(id, input.pin))
            })
            .collect()
    }

    /// Run one simulation cycle to a stable state.
    pub fn advance_cycle(&mut self) -> Result<(), OscillationError> {
        let saved = self.devices.snapshot();
        let stable = Stable {
            levels: self.devices.output_levels(),
            stored: saved
                .iter()
                .map(|device| match device.kind {
                    DeviceKind::DType { stored } => Some(stored),
                    _ => None,
                })
                .collect(),
        };

        self.step_sources(&stable.levels);

        let limit = self.settle_limit();
        for pass in 1..=limit {
            if !self.settle_pass(&stable) {
                trace!("cycle settled after {} pass(es)", pass);
                return Ok(());
            }
        }

        self.devices.restore(saved);
        Err(OscillationError { passes: limit })
    }

    fn step_sources(&mut self, previous: &[Vec<Option<bool>>]) {
        for (device, levels) in self.devices.iter_mut().zip(previous) {
            let last = levels.first().copied().flatten();
            let signal = match &mut device.kind {
                DeviceKind::Switch { on } => Signal::transition(last, *on),
                DeviceKind::Clock {
                    half_period,
                    counter,
                    high,
                } => {
                    *counter += 1;
                    if *counter >= *half_period {
                        *counter = 0;
                        *high = !*high;
                    }
                    Signal::transition(last, *high)
                }
                DeviceKind::SigGen { pattern, cursor } => match pattern.get(*cursor) {
                    Some(&bit) => {
                        *cursor += 1;
                        Signal::transition(last, bit)
                    }
                    None => {
                        *cursor = 0;
                        Signal::Blank
                    }
                },
                DeviceKind::Gate { .. } | DeviceKind::DType { .. } => continue,
            };
            device.outputs[0].signal = signal;
        }
    }

    /// Re-evaluate every gate and flip-flop once. Returns true if any output
    /// changed.
    fn settle_pass(&mut self, stable: &Stable) -> bool {
        let mut changed = false;
        for index in 0..self.devices.len() {
            let id = DeviceId(index);
            if let Some(evaluation) = self.evaluate(id, stable) {
                changed |= self.apply(id, evaluation, &stable.levels);
            }
        }
        changed
    }

    fn evaluate(&self, id: DeviceId, stable: &Stable) -> Option<Evaluation> {
        let device = self.devices.get(id)?;
        match &device.kind {
            DeviceKind::Gate { op, .. } => {
                let levels = device.inputs.iter().map(|input| self.level(input.driver));
                Some(Evaluation {
                    stored: None,
                    outputs: vec![op.eval(levels)],
                })
            }
            DeviceKind::DType { .. } => {
                // Recomputed from the cycle's starting bit on every pass.
                let mut next = stable.stored[id.0].unwrap_or(false);
                let clk = device.inputs[DTYPE_CLK].driver;
                let was_low = clk.and_then(|pin| self.previous_level(pin, &stable.levels));
                if was_low == Some(false) && self.level(clk) {
                    next = device.inputs[DTYPE_DATA]
                        .driver
                        .and_then(|pin| self.previous_level(pin, &stable.levels))
                        .unwrap_or(false);
                }
                if self.level(device.inputs[DTYPE_SET].driver) {
                    next = true;
                }
                if self.level(device.inputs[DTYPE_CLEAR].driver) {
                    next = false;
                }
                Some(Evaluation {
                    stored: Some(next),
                    outputs: vec![next, !next],
                })
            }
            DeviceKind::Clock { .. } | DeviceKind::Switch { .. } | DeviceKind::SigGen { .. } => {
                None
            }
        }
    }

    fn apply(
        &mut self,
        id: DeviceId,
        evaluation: Evaluation,
        previous: &[Vec<Option<bool>>],
    ) -> bool {
        let Some(device) = self.devices.get_mut(id) else {
            return false;
        };
        if let (Some(bit), DeviceKind::DType { stored }) = (evaluation.stored, &mut device.kind) {
            *stored = bit;
        }
        let mut changed = false;
        for ((output, high), last) in device
            .outputs
            .iter_mut()
            .zip(evaluation.outputs)
            .zip(&previous[id.0])
        {
            let signal = Signal::transition(*last, high);
            if output.signal != signal {
                output.signal = signal;
                changed = true;
            }
        }
        changed
    }

    /// Current level on `driver`; unconnected inputs read low.
    fn level(&self, driver: Option<PinRef>) -> bool {
        driver
            .and_then(|pin| self.devices.output_signal(pin))
            .is_some_and(Signal::is_high)
    }

    fn previous_level(&self, pin: PinRef, previous: &[Vec<Option<bool>>]) -> Option<bool> {
        let device = self.devices.get(pin.device)?;
        let index = device.output_index(pin.pin)?;
        previous[pin.device.0][index]
    }
}
