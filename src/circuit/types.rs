//! Core types for logic network representation.

use std::fmt;

use crate::names::NameId;

/// Index of a device in the device model, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// A pin on a device. `pin` is `None` for the single unnamed output of
/// gates, clocks, switches and signal generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinRef {
    pub device: DeviceId,
    pub pin: Option<NameId>,
}

impl PinRef {
    /// The unnamed output of `device`.
    pub fn output(device: DeviceId) -> Self {
        Self { device, pin: None }
    }

    /// The named pin `pin` of `device`.
    pub fn named(device: DeviceId, pin: NameId) -> Self {
        Self {
            device,
            pin: Some(pin),
        }
    }
}

/// Value carried by an output during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Low,
    High,
    /// Low in the previous cycle, high now.
    Rising,
    /// High in the previous cycle, low now.
    Falling,
    /// Not yet simulated.
    #[default]
    Blank,
}

impl Signal {
    /// Logic level seen by a consumer. Blank reads as low.
    pub fn is_high(self) -> bool {
        matches!(self, Signal::High | Signal::Rising)
    }

    /// Settled level, or `None` for [`Signal::Blank`].
    pub fn level(self) -> Option<bool> {
        match self {
            Signal::High | Signal::Rising => Some(true),
            Signal::Low | Signal::Falling => Some(false),
            Signal::Blank => None,
        }
    }

    /// Classify a new level against the level of the previous stable state.
    pub fn transition(previous: Option<bool>, high: bool) -> Self {
        match (previous, high) {
            (Some(false), true) => Signal::Rising,
            (Some(true), false) => Signal::Falling,
            (_, true) => Signal::High,
            (_, false) => Signal::Low,
        }
    }

    /// Compact numeric encoding used by the WASM bindings.
    pub fn code(self) -> u8 {
        match self {
            Signal::Low => 0,
            Signal::High => 1,
            Signal::Rising => 2,
            Signal::Falling => 3,
            Signal::Blank => 4,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Low => "LOW",
            Signal::High => "HIGH",
            Signal::Rising => "RISING",
            Signal::Falling => "FALLING",
            Signal::Blank => "BLANK",
        };
        f.write_str(s)
    }
}

/// Device type keywords of the definition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    And,
    Nand,
    Or,
    Nor,
    Xor,
    DType,
    Clock,
    Switch,
    SigGen,
}

impl DeviceType {
    pub const ALL: [DeviceType; 9] = [
        DeviceType::And,
        DeviceType::Nand,
        DeviceType::Or,
        DeviceType::Nor,
        DeviceType::Xor,
        DeviceType::DType,
        DeviceType::Clock,
        DeviceType::Switch,
        DeviceType::SigGen,
    ];

    /// Reserved word for this type.
    pub fn keyword(self) -> &'static str {
        match self {
            DeviceType::And => "AND",
            DeviceType::Nand => "NAND",
            DeviceType::Or => "OR",
            DeviceType::Nor => "NOR",
            DeviceType::Xor => "XOR",
            DeviceType::DType => "DTYPE",
            DeviceType::Clock => "CLOCK",
            DeviceType::Switch => "SWITCH",
            DeviceType::SigGen => "SIGGEN",
        }
    }

    /// Parse a device type from its reserved word (case-sensitive).
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.keyword() == s)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Optional configuration given after a device name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// Literal digit string, kept verbatim so signal-generator patterns keep
    /// their leading zeros.
    Number(String),
    /// `ON` (true) or `OFF` (false).
    State(bool),
}

/// Combinational function of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateOp {
    And,
    Nand,
    Or,
    Nor,
    Xor,
}

impl GateOp {
    /// Evaluate the gate over its input levels.
    pub fn eval(self, inputs: impl IntoIterator<Item = bool>) -> bool {
        let mut inputs = inputs.into_iter();
        match self {
            GateOp::And => inputs.all(|x| x),
            GateOp::Nand => !inputs.all(|x| x),
            GateOp::Or => inputs.any(|x| x),
            GateOp::Nor => !inputs.any(|x| x),
            GateOp::Xor => inputs.filter(|&x| x).count() % 2 == 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_classification() {
        assert_eq!(Signal::transition(Some(false), true), Signal::Rising);
        assert_eq!(Signal::transition(Some(true), false), Signal::Falling);
        assert_eq!(Signal::transition(Some(true), true), Signal::High);
        assert_eq!(Signal::transition(None, true), Signal::High);
        assert_eq!(Signal::transition(None, false), Signal::Low);
    }

    #[test]
    fn test_signal_levels() {
        assert!(Signal::Rising.is_high());
        assert!(!Signal::Falling.is_high());
        assert!(!Signal::Blank.is_high());
        assert_eq!(Signal::Blank.level(), None);
        assert_eq!(Signal::Falling.level(), Some(false));
    }

    #[test]
    fn test_gate_eval() {
        assert!(GateOp::And.eval([true, true, true]));
        assert!(!GateOp::And.eval([true, false]));
        assert!(GateOp::Nand.eval([true, false]));
        assert!(GateOp::Or.eval([false, true]));
        assert!(GateOp::Nor.eval([false, false]));
        assert!(GateOp::Xor.eval([true, false]));
        assert!(!GateOp::Xor.eval([true, true]));
    }

    #[test]
    fn test_device_type_keywords() {
        assert_eq!(DeviceType::from_keyword("DTYPE"), Some(DeviceType::DType));
        assert_eq!(DeviceType::from_keyword("and"), None);
        for ty in DeviceType::ALL {
            assert_eq!(DeviceType::from_keyword(ty.keyword()), Some(ty));
        }
    }
}
