//! Signal-trace recorder.

use super::devices::Devices;
use super::types::{PinRef, Signal};
use crate::error::MonitorError;

/// A monitored output and the values it took, one per completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub point: PinRef,
    pub signals: Vec<Signal>,
}

/// Registered monitor points, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Monitors {
    traces: Vec<Trace>,
}

impl Monitors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording `point` with a fresh, empty trace.
    pub fn monitor(&mut self, devices: &Devices, point: PinRef) -> Result<(), MonitorError> {
        if devices.get(point.device).is_none() {
            return Err(MonitorError::UnknownDevice);
        }
        if !devices.is_output(point) {
            return Err(MonitorError::NotAnOutput);
        }
        if self.is_monitored(point) {
            return Err(MonitorError::AlreadyMonitored);
        }
        self.traces.push(Trace {
            point,
            signals: Vec::new(),
        });
        Ok(())
    }

    /// Stop recording `point`, dropping its trace. False if it was not
    /// monitored.
    pub fn unmonitor(&mut self, point: PinRef) -> bool {
        let before = self.traces.len();
        self.traces.retain(|trace| trace.point != point);
        self.traces.len() != before
    }

    pub fn is_monitored(&self, point: PinRef) -> bool {
        self.traces.iter().any(|trace| trace.point == point)
    }

    /// Append the current value of every monitored output.
    pub fn record_cycle(&mut self, devices: &Devices) {
        for trace in &mut self.traces {
            let signal = devices.output_signal(trace.point).unwrap_or_default();
            trace.signals.push(signal);
        }
    }

    /// Pad the trace of `point` with blank cycles up to `cycles` entries, so a
    /// point added mid-run lines up with the others.
    pub fn fill_blank(&mut self, point: PinRef, cycles: usize) {
        if let Some(trace) = self.traces.iter_mut().find(|trace| trace.point == point) {
            if trace.signals.len() < cycles {
                trace.signals.resize(cycles, Signal::Blank);
            }
        }
    }

    /// Clear every trace, keeping the monitor points.
    pub fn reset(&mut self) {
        for trace in &mut self.traces {
            trace.signals.clear();
        }
    }

    pub fn trace(&self, point: PinRef) -> Option<&[Signal]> {
        self.traces
            .iter()
            .find(|trace| trace.point == point)
            .map(|trace| trace.signals.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter()
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::types::{DeviceId, DeviceType, Property};
    use crate::circuit::Network;
    use crate::names::Names;

    fn network() -> (Network, DeviceId, DeviceId) {
        let mut names = Names::new();
        let mut network = Network::new(Devices::new(&mut names));
        let sw = network
            .devices_mut()
            .declare(names.intern("sw"), DeviceType::Switch, Some(Property::State(true)))
            .unwrap();
        let d1 = network
            .devices_mut()
            .declare(names.intern("d1"), DeviceType::DType, None)
            .unwrap();
        (network, sw, d1)
    }

    #[test]
    fn test_monitor_errors() {
        let (network, sw, d1) = network();
        let devices = network.devices();
        let pins = devices.pin_names().clone();
        let mut monitors = Monitors::new();

        assert_eq!(
            monitors.monitor(devices, PinRef::named(d1, pins.clk)),
            Err(MonitorError::NotAnOutput)
        );
        assert_eq!(
            monitors.monitor(devices, PinRef::output(d1)),
            Err(MonitorError::NotAnOutput)
        );
        assert_eq!(
            monitors.monitor(devices, PinRef::output(DeviceId(5))),
            Err(MonitorError::UnknownDevice)
        );
        monitors.monitor(devices, PinRef::output(sw)).unwrap();
        assert_eq!(
            monitors.monitor(devices, PinRef::output(sw)),
            Err(MonitorError::AlreadyMonitored)
        );
        monitors.monitor(devices, PinRef::named(d1, pins.qbar)).unwrap();
        assert_eq!(monitors.len(), 2);
    }

    #[test]
    fn test_record_and_reset() {
        let (mut network, sw, _) = network();
        let mut monitors = Monitors::new();
        monitors.monitor(network.devices(), PinRef::output(sw)).unwrap();

        for _ in 0..3 {
            network.advance_cycle().unwrap();
            monitors.record_cycle(network.devices());
        }
        assert_eq!(
            monitors.trace(PinRef::output(sw)),
            Some(&[Signal::High, Signal::High, Signal::High][..])
        );

        monitors.reset();
        assert_eq!(monitors.trace(PinRef::output(sw)), Some(&[][..]));
        assert_eq!(monitors.len(), 1);
    }

    #[test]
    fn test_unmonitor_then_remonitor_starts_empty() {
        let (mut network, sw, _) = network();
        let mut monitors = Monitors::new();
        let point = PinRef::output(sw);
        monitors.monitor(network.devices(), point).unwrap();
        network.advance_cycle().unwrap();
        monitors.record_cycle(network.devices());

        assert!(monitors.unmonitor(point));
        assert!(!monitors.unmonitor(point));
        assert!(monitors.is_empty());

        monitors.monitor(network.devices(), point).unwrap();
        assert_eq!(monitors.trace(point), Some(&[][..]));
    }
}
