//! Device model: declared devices, their configuration and pin states.

use std::collections::HashMap;

use super::types::{DeviceId, DeviceType, GateOp, PinRef, Property, Signal};
use crate::error::DeviceError;
use crate::names::{NameId, Names};

/// Largest input count accepted for AND/NAND/OR/NOR gates.
pub const MAX_GATE_INPUTS: usize = 16;

/// Kind of a device together with its configuration and sequential state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    Gate { op: GateOp, inputs: usize },
    /// Edge-triggered flip-flop holding one stored bit.
    DType { stored: bool },
    /// Toggles its output every `half_period` cycles.
    Clock {
        half_period: u32,
        counter: u32,
        high: bool,
    },
    Switch { on: bool },
    /// Steps through `pattern`, emits one blank cycle, then loops.
    SigGen { pattern: Vec<bool>, cursor: usize },
}

impl DeviceKind {
    /// Validate the property given for `ty` and build the matching kind.
    pub fn configure(ty: DeviceType, property: Option<Property>) -> Result<Self, DeviceError> {
        use DeviceError::{InvalidConfiguration, MissingConfiguration, UnexpectedConfiguration};

        match (ty, property) {
            (DeviceType::And | DeviceType::Nand | DeviceType::Or | DeviceType::Nor, property) => {
                let op = match ty {
                    DeviceType::And => GateOp::And,
                    DeviceType::Nand => GateOp::Nand,
                    DeviceType::Or => GateOp::Or,
                    _ => GateOp::Nor,
                };
                match property {
                    None => Err(MissingConfiguration { kind: ty }),
                    Some(Property::Number(text)) => match text.parse::<usize>() {
                        Ok(inputs) if (1..=MAX_GATE_INPUTS).contains(&inputs) => {
                            Ok(DeviceKind::Gate { op, inputs })
                        }
                        _ => Err(InvalidConfiguration { kind: ty }),
                    },
                    Some(Property::State(_)) => Err(InvalidConfiguration { kind: ty }),
                }
            }
            (DeviceType::Xor, None) => Ok(DeviceKind::Gate {
                op: GateOp::Xor,
                inputs: 2,
            }),
            (DeviceType::DType, None) => Ok(DeviceKind::DType { stored: false }),
            (DeviceType::Xor | DeviceType::DType, Some(_)) => {
                Err(UnexpectedConfiguration { kind: ty })
            }
            (DeviceType::Clock, None) => Err(MissingConfiguration { kind: ty }),
            (DeviceType::Clock, Some(Property::Number(text))) => match text.parse::<u32>() {
                Ok(half_period) if half_period > 0 => Ok(DeviceKind::Clock {
                    half_period,
                    counter: 0,
                    high: false,
                }),
                _ => Err(InvalidConfiguration { kind: ty }),
            },
            (DeviceType::Clock, Some(Property::State(_))) => Err(InvalidConfiguration { kind: ty }),
            (DeviceType::Switch, None) => Err(MissingConfiguration { kind: ty }),
            (DeviceType::Switch, Some(Property::State(on))) => Ok(DeviceKind::Switch { on }),
            (DeviceType::Switch, Some(Property::Number(text))) => match text.as_str() {
                "0" => Ok(DeviceKind::Switch { on: false }),
                "1" => Ok(DeviceKind::Switch { on: true }),
                _ => Err(InvalidConfiguration { kind: ty }),
            },
            (DeviceType::SigGen, None) => Err(MissingConfiguration { kind: ty }),
            (DeviceType::SigGen, Some(Property::Number(text))) => {
                if !text.is_empty() && text.chars().all(|c| c == '0' || c == '1') {
                    Ok(DeviceKind::SigGen {
                        pattern: text.chars().map(|c| c == '1').collect(),
                        cursor: 0,
                    })
                } else {
                    Err(InvalidConfiguration { kind: ty })
                }
            }
            (DeviceType::SigGen, Some(Property::State(_))) => {
                Err(InvalidConfiguration { kind: ty })
            }
        }
    }

    /// Return sequential state to its initial condition. Switch settings are
    /// user input, not state, and are kept.
    fn reset(&mut self) {
        match self {
            DeviceKind::DType { stored } => *stored = false,
            DeviceKind::Clock { counter, high, .. } => {
                *counter = 0;
                *high = false;
            }
            DeviceKind::SigGen { cursor, .. } => *cursor = 0,
            DeviceKind::Gate { .. } | DeviceKind::Switch { .. } => {}
        }
    }
}

/// An input pin and the output driving it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub pin: NameId,
    pub driver: Option<PinRef>,
}

/// An output pin and its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub pin: Option<NameId>,
    pub signal: Signal,
}

/// A declared device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: NameId,
    pub device_type: DeviceType,
    pub kind: DeviceKind,
    pub(crate) inputs: Vec<Input>,
    pub(crate) outputs: Vec<Output>,
}

impl Device {
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub(crate) fn input_index(&self, pin: Option<NameId>) -> Option<usize> {
        let pin = pin?;
        self.inputs.iter().position(|input| input.pin == pin)
    }

    pub(crate) fn output_index(&self, pin: Option<NameId>) -> Option<usize> {
        self.outputs.iter().position(|output| output.pin == pin)
    }
}

/// Interned names of the fixed pins.
#[derive(Debug, Clone)]
pub struct PinNames {
    pub data: NameId,
    pub clk: NameId,
    pub set: NameId,
    pub clear: NameId,
    pub q: NameId,
    pub qbar: NameId,
    /// Gate inputs "1" ..= "16".
    pub ordinals: Vec<NameId>,
}

impl PinNames {
    fn intern(names: &mut Names) -> Self {
        let ordinals = names.intern_all((1..=MAX_GATE_INPUTS).map(|i| i.to_string()));
        Self {
            data: names.intern("DATA"),
            clk: names.intern("CLK"),
            set: names.intern("SET"),
            clear: names.intern("CLEAR"),
            q: names.intern("Q"),
            qbar: names.intern("QBAR"),
            ordinals,
        }
    }
}

/// D-type input positions, in the order the pins are created.
pub(crate) const DTYPE_DATA: usize = 0;
pub(crate) const DTYPE_CLK: usize = 1;
pub(crate) const DTYPE_SET: usize = 2;
pub(crate) const DTYPE_CLEAR: usize = 3;

/// All declared devices, in declaration order.
#[derive(Debug, Clone)]
pub struct Devices {
    devices: Vec<Device>,
    by_name: HashMap<NameId, DeviceId>,
    pins: PinNames,
}

impl Devices {
    /// Create an empty device model, interning the fixed pin names.
    pub fn new(names: &mut Names) -> Self {
        Self {
            devices: Vec::new(),
            by_name: HashMap::new(),
            pins: PinNames::intern(names),
        }
    }

    /// Declare a device named `name`.
    pub fn declare(
        &mut self,
        name: NameId,
        ty: DeviceType,
        property: Option<Property>,
    ) -> Result<DeviceId, DeviceError> {
        if self.by_name.contains_key(&name) {
            return Err(DeviceError::DuplicateName);
        }
        let kind = DeviceKind::configure(ty, property)?;

        let pin_input = |pin| Input { pin, driver: None };
        let pin_output = |pin| Output {
            pin,
            signal: Signal::Blank,
        };
        let (inputs, outputs) = match &kind {
            DeviceKind::Gate { inputs, .. } => (
                self.pins.ordinals[..*inputs]
                    .iter()
                    .map(|&pin| pin_input(pin))
                    .collect(),
                vec![pin_output(None)],
            ),
            DeviceKind::DType { .. } => (
                vec![
                    pin_input(self.pins.data),
                    pin_input(self.pins.clk),
                    pin_input(self.pins.set),
                    pin_input(self.pins.clear),
                ],
                vec![pin_output(Some(self.pins.q)), pin_output(Some(self.pins.qbar))],
            ),
            DeviceKind::Clock { .. } | DeviceKind::Switch { .. } | DeviceKind::SigGen { .. } => {
                (Vec::new(), vec![pin_output(None)])
            }
        };

        let id = DeviceId(self.devices.len());
        self.devices.push(Device {
            name,
            device_type: ty,
            kind,
            inputs,
            outputs,
        });
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Find the device declared under `name`.
    pub fn resolve(&self, name: NameId) -> Option<DeviceId> {
        self.by_name.get(&name).copied()
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(id.0)
    }

    /// Iterate over devices in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &Device)> {
        self.devices
            .iter()
            .enumerate()
            .map(|(i, device)| (DeviceId(i), device))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// All devices of the given type.
    pub fn find_kind(&self, ty: DeviceType) -> Vec<DeviceId> {
        self.iter()
            .filter(|(_, device)| device.device_type == ty)
            .map(|(id, _)| id)
            .collect()
    }

    /// Interned names of the fixed pins.
    pub fn pin_names(&self) -> &PinNames {
        &self.pins
    }

    /// Change a switch setting. The new value appears on the next cycle.
    pub fn set_switch(&mut self, id: DeviceId, value: bool) -> Result<(), DeviceError> {
        let device = self.get_mut(id).ok_or(DeviceError::UnknownDevice)?;
        match &mut device.kind {
            DeviceKind::Switch { on } => {
                *on = value;
                Ok(())
            }
            _ => Err(DeviceError::NotASwitch),
        }
    }

    /// Reset sequential state and blank every output, keeping topology and
    /// switch settings.
    pub fn cold_start(&mut self) {
        for device in &mut self.devices {
            device.kind.reset();
            for output in &mut device.outputs {
                output.signal = Signal::Blank;
            }
        }
    }

    /// Level of every output, indexed by device then output position.
    pub(crate) fn output_levels(&self) -> Vec<Vec<Option<bool>>> {
        self.devices
            .iter()
            .map(|device| device.outputs.iter().map(|o| o.signal.level()).collect())
            .collect()
    }

    pub(crate) fn snapshot(&self) -> Vec<Device> {
        self.devices.clone()
    }

    pub(crate) fn restore(&mut self, devices: Vec<Device>) {
        self.devices = devices;
    }

    /// True if `pin` names an output of an existing device.
    pub fn is_output(&self, pin: PinRef) -> bool {
        self.get(pin.device)
            .is_some_and(|device| device.output_index(pin.pin).is_some())
    }

    /// True if `pin` names an input of an existing device.
    pub fn is_input(&self, pin: PinRef) -> bool {
        self.get(pin.device)
            .is_some_and(|device| device.input_index(pin.pin).is_some())
    }

    /// Current value of an output, or `None` if `pin` is not an output.
    pub fn output_signal(&self, pin: PinRef) -> Option<Signal> {
        let device = self.get(pin.device)?;
        let index = device.output_index(pin.pin)?;
        Some(device.outputs[index].signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(text: &str) -> Option<Property> {
        Some(Property::Number(text.to_string()))
    }

    fn model() -> (Names, Devices) {
        let mut names = Names::new();
        let devices = Devices::new(&mut names);
        (names, devices)
    }

    #[test]
    fn test_declare_gate_creates_ordinal_inputs() {
        let (mut names, mut devices) = model();
        let g1 = names.intern("g1");
        let id = devices.declare(g1, DeviceType::And, number("3")).unwrap();
        let device = devices.get(id).unwrap();
        assert_eq!(device.inputs().len(), 3);
        assert_eq!(device.outputs().len(), 1);
        assert_eq!(devices.resolve(g1), Some(id));
        let third = names.lookup("3").unwrap();
        assert!(devices.is_input(PinRef::named(id, third)));
        assert!(devices.is_output(PinRef::output(id)));
    }

    #[test]
    fn test_declare_duplicate_name() {
        let (mut names, mut devices) = model();
        let sw = names.intern("sw");
        devices
            .declare(sw, DeviceType::Switch, Some(Property::State(false)))
            .unwrap();
        assert_eq!(
            devices.declare(sw, DeviceType::Clock, number("2")),
            Err(DeviceError::DuplicateName)
        );
        assert_eq!(devices.len(), 1);
    }

    #[test]
    fn test_configuration_errors() {
        use DeviceType::*;
        let missing = |kind| Err(DeviceError::MissingConfiguration { kind });
        let invalid = |kind| Err(DeviceError::InvalidConfiguration { kind });
        let unexpected = |kind| Err(DeviceError::UnexpectedConfiguration { kind });

        assert_eq!(DeviceKind::configure(And, None), missing(And));
        assert_eq!(DeviceKind::configure(Nor, number("0")), invalid(Nor));
        assert_eq!(DeviceKind::configure(Nand, number("17")), invalid(Nand));
        assert_eq!(
            DeviceKind::configure(Or, Some(Property::State(true))),
            invalid(Or)
        );
        assert_eq!(DeviceKind::configure(Xor, number("2")), unexpected(Xor));
        assert_eq!(
            DeviceKind::configure(DType, Some(Property::State(true))),
            unexpected(DType)
        );
        assert_eq!(DeviceKind::configure(Clock, None), missing(Clock));
        assert_eq!(DeviceKind::configure(Clock, number("0")), invalid(Clock));
        assert_eq!(
            DeviceKind::configure(Clock, number("99999999999")),
            invalid(Clock)
        );
        assert_eq!(DeviceKind::configure(Switch, None), missing(Switch));
        assert_eq!(DeviceKind::configure(Switch, number("2")), invalid(Switch));
        assert_eq!(DeviceKind::configure(SigGen, number("0120")), invalid(SigGen));
        assert_eq!(DeviceKind::configure(SigGen, None), missing(SigGen));
    }

    #[test]
    fn test_valid_configurations() {
        assert_eq!(
            DeviceKind::configure(DeviceType::Nand, number("16")),
            Ok(DeviceKind::Gate {
                op: GateOp::Nand,
                inputs: 16
            })
        );
        assert_eq!(
            DeviceKind::configure(DeviceType::Switch, number("1")),
            Ok(DeviceKind::Switch { on: true })
        );
        assert_eq!(
            DeviceKind::configure(DeviceType::SigGen, number("0110")),
            Ok(DeviceKind::SigGen {
                pattern: vec![false, true, true, false],
                cursor: 0
            })
        );
    }

    #[test]
    fn test_dtype_pins() {
        let (mut names, mut devices) = model();
        let d1 = names.intern("d1");
        let id = devices.declare(d1, DeviceType::DType, None).unwrap();
        let pins = devices.pin_names().clone();
        assert!(devices.is_output(PinRef::named(id, pins.q)));
        assert!(devices.is_output(PinRef::named(id, pins.qbar)));
        assert!(devices.is_input(PinRef::named(id, pins.clk)));
        assert!(!devices.is_output(PinRef::output(id)));
        assert!(!devices.is_output(PinRef::named(id, pins.data)));
    }

    #[test]
    fn test_set_switch() {
        let (mut names, mut devices) = model();
        let sw = devices
            .declare(names.intern("sw"), DeviceType::Switch, Some(Property::State(false)))
            .unwrap();
        let clk = devices
            .declare(names.intern("clk"), DeviceType::Clock, number("1"))
            .unwrap();
        devices.set_switch(sw, true).unwrap();
        assert_eq!(
            devices.get(sw).unwrap().kind,
            DeviceKind::Switch { on: true }
        );
        assert_eq!(devices.set_switch(clk, true), Err(DeviceError::NotASwitch));
        assert_eq!(
            devices.set_switch(DeviceId(9), true),
            Err(DeviceError::UnknownDevice)
        );
    }

    #[test]
    fn test_cold_start_keeps_switch_settings() {
        let (mut names, mut devices) = model();
        let sw = devices
            .declare(names.intern("sw"), DeviceType::Switch, Some(Property::State(false)))
            .unwrap();
        let clk = devices
            .declare(names.intern("clk"), DeviceType::Clock, number("3"))
            .unwrap();
        devices.set_switch(sw, true).unwrap();
        if let DeviceKind::Clock { counter, high, .. } = &mut devices.get_mut(clk).unwrap().kind {
            *counter = 2;
            *high = true;
        }
        devices.get_mut(sw).unwrap().outputs[0].signal = Signal::High;

        devices.cold_start();

        assert_eq!(devices.get(sw).unwrap().kind, DeviceKind::Switch { on: true });
        assert_eq!(
            devices.get(clk).unwrap().kind,
            DeviceKind::Clock {
                half_period: 3,
                counter: 0,
                high: false
            }
        );
        assert_eq!(devices.output_signal(PinRef::output(sw)), Some(Signal::Blank));
    }
}
