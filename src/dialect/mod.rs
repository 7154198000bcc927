//! Dialect configuration
//!
//! Everything a controller needs from the renderer: flags, literal blocks,
//! unit codes and the mnemonic macro table. A config is cloned into each
//! export, so one export never sees another's toggles.

use crate::lexer::{self, Token};
use crate::model::{BoundBox, MachineUnits, Point3D};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Output unit selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Metric,
    Imperial,
}

impl From<MachineUnits> for Units {
    fn from(u: MachineUnits) -> Self {
        match u {
            MachineUnits::Metric => Units::Metric,
            MachineUnits::Imperial => Units::Imperial,
        }
    }
}

/// G-code words selecting the unit system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCodes {
    pub metric: String,
    pub imperial: String,
}

impl Default for UnitCodes {
    fn default() -> Self {
        Self {
            metric: "G21".to_string(),
            imperial: "G20".to_string(),
        }
    }
}

impl UnitCodes {
    pub fn code(&self, units: Units) -> &str {
        match units {
            Units::Metric => &self.metric,
            Units::Imperial => &self.imperial,
        }
    }
}

/// Default machine the dialect targets when the job carries none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel: Option<BoundBox>,
}

impl MachineDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            travel: None,
        }
    }

    pub fn with_travel(mut self, min: Point3D, max: Point3D) -> Self {
        self.travel = Some(BoundBox { min, max });
        self
    }
}

/// Expansion strategy bound to a mnemonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroKind {
    ToolChange,
    SpindleOn,
    SpindleOff,
    Message,
}

/// What a `message` command does when comments are disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePolicy {
    /// Throw away everything already rendered for the enclosing path
    #[default]
    DiscardNode,
    /// Only drop the message line itself
    DropLine,
}

/// Which text reaches the destination after an interactive review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Write the reviewed (possibly edited) text
    Edited,
    /// Write the text as rendered, even when the review changed it
    Original,
}

/// Where the machine resolver looks for machine metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineScope {
    /// The exported objects themselves
    TopLevel,
    /// Direct children of exported groups
    GroupChildren,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialectConfig {
    pub output_header: bool,
    pub output_comments: bool,
    pub output_line_numbers: bool,
    /// Suppress a mnemonic identical to the previous command's
    pub modal: bool,
    pub show_editor: bool,
    /// Emit `(compound: ..)` / `(Path: ..)` comments for tree nodes
    pub label_comments: bool,

    pub line_start: u32,
    pub line_step: u32,
    pub command_space: String,

    pub preamble: String,
    pub postamble: String,
    pub pre_operation: String,
    pub post_operation: String,
    pub tool_change: String,

    pub units: UnitCodes,
    pub default_units: Units,
    pub machine: MachineDescriptor,

    pub macros: BTreeMap<String, MacroKind>,
    pub message_policy: MessagePolicy,
    pub write_policy: WritePolicy,
    pub machine_scope: MachineScope,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            output_header: true,
            output_comments: true,
            output_line_numbers: false,
            modal: false,
            show_editor: false,
            label_comments: false,
            line_start: 100,
            line_step: 10,
            command_space: " ".to_string(),
            preamble: String::new(),
            postamble: String::new(),
            pre_operation: String::new(),
            post_operation: String::new(),
            tool_change: String::new(),
            units: UnitCodes::default(),
            default_units: Units::Metric,
            machine: MachineDescriptor::new("Generic"),
            macros: default_macros(),
            message_policy: MessagePolicy::default(),
            write_policy: WritePolicy::Edited,
            machine_scope: MachineScope::TopLevel,
        }
    }
}

pub fn default_macros() -> BTreeMap<String, MacroKind> {
    [
        ("M6", MacroKind::ToolChange),
        ("M3", MacroKind::SpindleOn),
        ("M5", MacroKind::SpindleOff),
        ("message", MacroKind::Message),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl DialectConfig {
    pub fn macro_for(&self, mnemonic: &str) -> Option<MacroKind> {
        self.macros.get(mnemonic).copied()
    }

    /// Apply `--header`/`--no-header` style toggles. Unrecognized tokens are ignored.
    pub fn apply_args(&mut self, args: &str) {
        for (token, _) in lexer::lex(args) {
            match token {
                Token::Header => self.output_header = true,
                Token::NoHeader => self.output_header = false,
                Token::Comments => self.output_comments = true,
                Token::NoComments => self.output_comments = false,
                Token::LineNumbers => self.output_line_numbers = true,
                Token::NoLineNumbers => self.output_line_numbers = false,
                Token::ShowEditor => self.show_editor = true,
                Token::NoShowEditor => self.show_editor = false,
                Token::Unknown(arg) => tracing::debug!("ignoring post-processor argument {}", arg),
            }
        }
    }

    pub fn with_args(mut self, args: &str) -> Self {
        self.apply_args(args);
        self
    }
}

/// Partial config read from JSON and layered over a dialect's defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_line_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_editor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_space: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postamble: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitCodes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_units: Option<Units>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<MachineDescriptor>,
    /// Merged into the dialect's macro table rather than replacing it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros: Option<BTreeMap<String, MacroKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_policy: Option<MessagePolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_policy: Option<WritePolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_scope: Option<MachineScope>,
}

impl DialectOverrides {
    /// Load overrides from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let overrides: DialectOverrides = serde_json::from_str(&content)?;
        Ok(overrides)
    }

    pub fn apply(self, config: &mut DialectConfig) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field { config.$field = v; })*
            };
        }

        take!(
            output_header,
            output_comments,
            output_line_numbers,
            modal,
            show_editor,
            label_comments,
            line_start,
            line_step,
            command_space,
            preamble,
            postamble,
            pre_operation,
            post_operation,
            tool_change,
            units,
            default_units,
            machine,
            message_policy,
            write_policy,
            machine_scope,
        );

        if let Some(macros) = self.macros {
            config.macros.extend(macros);
        }
    }
}
