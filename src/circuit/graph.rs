//! The assembled logic network.

use super::devices::Devices;
use super::monitors::Monitors;
use super::network::Network;
use super::types::{DeviceId, DeviceType, PinRef};
use crate::error::MonitorError;
use crate::names::{NameId, Names};

/// A complete logic network: symbol table, devices and wiring, and the
/// monitor points recorded each cycle.
#[derive(Debug, Clone)]
pub struct Circuit {
    pub names: Names,
    pub network: Network,
    pub monitors: Monitors,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        let mut names = Names::new();
        let devices = Devices::new(&mut names);
        Self {
            names,
            network: Network::new(devices),
            monitors: Monitors::new(),
        }
    }

    pub fn devices(&self) -> &Devices {
        self.network.devices()
    }

    /// Resolve an interned name, or `"?"` if the id is unknown.
    pub fn name(&self, id: NameId) -> &str {
        self.names.resolve(id).unwrap_or("?")
    }

    pub fn device_name(&self, id: DeviceId) -> &str {
        self.devices()
            .get(id)
            .map_or("?", |device| self.name(device.name))
    }

    /// Display name of a pin: `dev` for an unnamed output, `dev.PIN` otherwise.
    pub fn signal_name(&self, pin: PinRef) -> String {
        let device = self.device_name(pin.device);
        match pin.pin {
            Some(pin) => format!("{}.{}", device, self.name(pin)),
            None => device.to_string(),
        }
    }

    /// Find the device declared as `name`.
    pub fn device_ref(&self, name: &str) -> Option<DeviceId> {
        self.devices().resolve(self.names.lookup(name)?)
    }

    /// Parse `dev` or `dev.PIN` into a reference to an existing output.
    pub fn signal_ref(&self, name: &str) -> Option<PinRef> {
        let point = match name.split_once('.') {
            Some((device, pin)) => PinRef::named(self.device_ref(device)?, self.names.lookup(pin)?),
            None => PinRef::output(self.device_ref(name)?),
        };
        self.devices().is_output(point).then_some(point)
    }

    /// Names of every output, split into (monitored, not monitored).
    pub fn signal_names(&self) -> (Vec<String>, Vec<String>) {
        let mut monitored = Vec::new();
        let mut unmonitored = Vec::new();
        for (id, device) in self.devices().iter() {
            for output in device.outputs() {
                let point = PinRef {
                    device: id,
                    pin: output.pin,
                };
                if self.monitors.is_monitored(point) {
                    monitored.push(self.signal_name(point));
                } else {
                    unmonitored.push(self.signal_name(point));
                }
            }
        }
        (monitored, unmonitored)
    }

    /// Names of every switch, in declaration order.
    pub fn switch_names(&self) -> Vec<String> {
        self.devices()
            .find_kind(DeviceType::Switch)
            .into_iter()
            .map(|id| self.device_name(id).to_string())
            .collect()
    }

    /// Register a monitor point.
    pub fn monitor(&mut self, point: PinRef) -> Result<(), MonitorError> {
        self.monitors.monitor(self.network.devices(), point)
    }

    /// Append the current value of every monitored output to its trace.
    pub fn record_cycle(&mut self) {
        self.monitors.record_cycle(self.network.devices());
    }

    /// Reset sequential state and clear every trace.
    pub fn cold_start(&mut self) {
        self.network.devices_mut().cold_start();
        self.monitors.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::types::Property;

    fn circuit() -> Circuit {
        let mut circuit = Circuit::new();
        for (name, ty, property) in [
            ("sw1", DeviceType::Switch, Some(Property::State(false))),
            ("sw2", DeviceType::Switch, Some(Property::State(true))),
            ("d1", DeviceType::DType, None),
        ] {
            let name = circuit.names.intern(name);
            circuit
                .network
                .devices_mut()
                .declare(name, ty, property)
                .unwrap();
        }
        circuit
    }

    #[test]
    fn test_signal_ref_round_trip() {
        let circuit = circuit();
        let q = circuit.signal_ref("d1.Q").unwrap();
        assert_eq!(circuit.signal_name(q), "d1.Q");
        let sw1 = circuit.signal_ref("sw1").unwrap();
        assert_eq!(circuit.signal_name(sw1), "sw1");
    }

    #[test]
    fn test_signal_ref_rejects_non_outputs() {
        let circuit = circuit();
        assert_eq!(circuit.signal_ref("d1"), None);
        assert_eq!(circuit.signal_ref("d1.DATA"), None);
        assert_eq!(circuit.signal_ref("sw1.Q"), None);
        assert_eq!(circuit.signal_ref("nope"), None);
    }

    #[test]
    fn test_signal_names_split_by_monitoring() {
        let mut circuit = circuit();
        let q = circuit.signal_ref("d1.Q").unwrap();
        circuit.monitor(q).unwrap();
        let (monitored, unmonitored) = circuit.signal_names();
        assert_eq!(monitored, vec!["d1.Q"]);
        assert_eq!(unmonitored, vec!["sw1", "sw2", "d1.QBAR"]);
    }

    #[test]
    fn test_switch_names() {
        assert_eq!(circuit().switch_names(), vec!["sw1", "sw2"]);
    }
}
