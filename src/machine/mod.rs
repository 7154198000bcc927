//! Machine resolution
//!
//! Finds the machine definition in the exported objects so the output uses
//! the project's unit system rather than the dialect default.

use crate::dialect::{DialectConfig, MachineScope, Units};
use crate::model::{BoundBox, Machine, PathNode};

/// Machine data in effect for one export
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMachine {
    pub name: String,
    pub units: Units,
    pub travel: Option<BoundBox>,
    /// False when the dialect defaults were used
    pub found: bool,
}

impl ResolvedMachine {
    pub fn unit_code<'a>(&self, config: &'a DialectConfig) -> &'a str {
        config.units.code(self.units)
    }
}

/// First machine definition within `scope`
pub fn find_machine(objects: &[PathNode], scope: MachineScope) -> Option<&Machine> {
    match scope {
        MachineScope::TopLevel => objects.iter().find_map(PathNode::machine),
        MachineScope::GroupChildren => objects.iter().find_map(|obj| match obj {
            PathNode::Group { children, .. } => children.iter().find_map(PathNode::machine),
            PathNode::Leaf { .. } => None,
        }),
    }
}

pub fn resolve(objects: &[PathNode], config: &DialectConfig) -> ResolvedMachine {
    match find_machine(objects, config.machine_scope) {
        Some(machine) => {
            let resolved = ResolvedMachine {
                name: machine.name.clone(),
                units: machine.units.into(),
                travel: machine.bounds.or(config.machine.travel),
                found: true,
            };
            tracing::debug!(
                "using machine {} ({:?}, travel {:?})",
                resolved.name,
                resolved.units,
                resolved.travel
            );
            resolved
        }
        None => {
            tracing::warn!("No machine found in this selection");
            ResolvedMachine {
                name: config.machine.name.clone(),
                units: config.default_units,
                travel: config.machine.travel,
                found: false,
            }
        }
    }
}
