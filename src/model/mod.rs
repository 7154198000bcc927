//! Tool-path object model
//!
//! Commands arrive already computed from the tool-path generator. This module
//! only describes them; nothing here knows about any controller dialect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameter letters a controller dialect may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    X,
    Y,
    Z,
    A,
    B,
    I,
    J,
    F, // Feed rate
    S, // Spindle speed
    T, // Tool number
    Q,
    R,
    L,
}

impl Param {
    /// Emission order for parameter words. K is deliberately absent: arcs are
    /// emitted in the XY plane only.
    pub const ORDER: [Param; 13] = [
        Param::X,
        Param::Y,
        Param::Z,
        Param::A,
        Param::B,
        Param::I,
        Param::J,
        Param::F,
        Param::S,
        Param::T,
        Param::Q,
        Param::R,
        Param::L,
    ];

    pub fn letter(self) -> char {
        match self {
            Param::X => 'X',
            Param::Y => 'Y',
            Param::Z => 'Z',
            Param::A => 'A',
            Param::B => 'B',
            Param::I => 'I',
            Param::J => 'J',
            Param::F => 'F',
            Param::S => 'S',
            Param::T => 'T',
            Param::Q => 'Q',
            Param::R => 'R',
            Param::L => 'L',
        }
    }

    pub fn from_letter(letter: &str) -> Option<Param> {
        Param::ORDER
            .iter()
            .copied()
            .find(|p| letter.len() == 1 && letter.starts_with(p.letter()))
    }

    /// Render one parameter word, e.g. `X1.0000`, `F500.00`, `T3`
    pub fn format(self, value: &ParamValue) -> String {
        match value {
            ParamValue::Number(n) => match self {
                Param::F => format!("F{:.2}", n),
                Param::T => format!("T{}", n.trunc() as i64),
                _ => format!("{}{:.4}", self.letter(), n),
            },
            ParamValue::Text(s) => format!("{}{}", self.letter(), s),
        }
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Parameter value as supplied by the tool-path layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

/// One motion or machine-control instruction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    /// Mnemonic, e.g. "G1", "M3", "message"
    pub name: String,

    /// Parameters keyed by letter. Keys outside [`Param::ORDER`] are kept
    /// here but never rendered.
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Builder-style parameter setter
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, param: Param) -> Option<&ParamValue> {
        self.params.get(param.letter().to_string().as_str())
    }

    /// Parameters in emission order, unknown keys skipped
    pub fn ordered_params(&self) -> impl Iterator<Item = (Param, &ParamValue)> + '_ {
        Param::ORDER
            .iter()
            .filter_map(move |p| self.get(*p).map(|v| (*p, v)))
    }

    /// Keys that will never be rendered
    pub fn unknown_params(&self) -> impl Iterator<Item = &str> + '_ {
        self.params
            .keys()
            .map(String::as_str)
            .filter(|k| Param::from_letter(k).is_none())
    }
}

/// Unit system declared by a machine definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineUnits {
    Metric,
    /// Anything that isn't "Metric" is treated as imperial
    #[serde(other)]
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Machine travel envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundBox {
    pub min: Point3D,
    pub max: Point3D,
}

/// Machine metadata attached to a project or one of its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,
    pub units: MachineUnits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundBox>,
}

impl Machine {
    pub fn new(name: &str, units: MachineUnits) -> Self {
        Self {
            name: name.to_string(),
            units,
            bounds: None,
        }
    }
}

/// Node of the exported object tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathNode {
    /// A tool path, or a non-path object (stock, machine) when `commands` is `None`
    Leaf {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commands: Option<Vec<Command>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        machine: Option<Machine>,
    },
    /// A compound or project
    Group {
        label: String,
        #[serde(default)]
        children: Vec<PathNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        machine: Option<Machine>,
    },
}

impl PathNode {
    pub fn leaf(label: &str, commands: Vec<Command>) -> Self {
        PathNode::Leaf {
            label: label.to_string(),
            commands: Some(commands),
            machine: None,
        }
    }

    /// Non-path object such as a stock definition
    pub fn placeholder(label: &str) -> Self {
        PathNode::Leaf {
            label: label.to_string(),
            commands: None,
            machine: None,
        }
    }

    /// Machine definition object living inside a project
    pub fn machine_definition(machine: Machine) -> Self {
        PathNode::Leaf {
            label: "Machine".to_string(),
            commands: None,
            machine: Some(machine),
        }
    }

    pub fn group(label: &str, children: Vec<PathNode>) -> Self {
        PathNode::Group {
            label: label.to_string(),
            children,
            machine: None,
        }
    }

    pub fn with_machine(mut self, m: Machine) -> Self {
        match &mut self {
            PathNode::Leaf { machine, .. } | PathNode::Group { machine, .. } => *machine = Some(m),
        }
        self
    }

    pub fn label(&self) -> &str {
        match self {
            PathNode::Leaf { label, .. } | PathNode::Group { label, .. } => label,
        }
    }

    pub fn machine(&self) -> Option<&Machine> {
        match self {
            PathNode::Leaf { machine, .. } | PathNode::Group { machine, .. } => machine.as_ref(),
        }
    }

    /// Groups always count as path objects; leaves only when they carry commands
    pub fn has_path(&self) -> bool {
        match self {
            PathNode::Leaf { commands, .. } => commands.is_some(),
            PathNode::Group { .. } => true,
        }
    }
}
