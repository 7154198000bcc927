//! ShopBot post-processor
//!
//! ShopBot's control software takes a handful of its own spindle commands
//! alongside plain G-code. Spindle speed is set directly with `TR`.

use crate::dialect::{DialectConfig, MachineDescriptor, MachineScope, WritePolicy};
use crate::post::{MacroLine, PostProcessor};

pub struct ShopBotPost;

impl PostProcessor for ShopBotPost {
    fn name(&self) -> &str {
        "shopbot"
    }

    fn revision(&self) -> &str {
        "0.0.2"
    }

    fn config(&self) -> DialectConfig {
        DialectConfig {
            show_editor: false,
            label_comments: true,
            preamble: "G17\nG91\n".to_string(),
            postamble: "\nG00 X0.0 Y0.0\nG17\nG91\nM2\n".to_string(),
            machine: MachineDescriptor::new("ShopBot"),
            write_policy: WritePolicy::Original,
            machine_scope: MachineScope::GroupChildren,
            ..DialectConfig::default()
        }
    }

    fn spindle_speed(&self, rpm: i64) -> Vec<MacroLine> {
        vec![
            MacroLine::remark("set spindle speed"),
            MacroLine::code(format!("TR,{},1", rpm)),
        ]
    }

    fn spindle_on(&self) -> Vec<MacroLine> {
        vec![
            MacroLine::remark("turn spindle on"),
            MacroLine::code("SO,1,1"),
            // Needed for the control software to wait reliably
            MacroLine::code("PAUSE 1"),
        ]
    }

    fn spindle_off(&self) -> Vec<MacroLine> {
        vec![
            MacroLine::remark("turn spindle off"),
            MacroLine::code("SO,1,0"),
        ]
    }
}
