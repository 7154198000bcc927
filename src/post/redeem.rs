//! Redeem post-processor
//!
//! Targets a 3-axis mill on Redeem/Replicape whose spindle is a brushless
//! motor behind a hobby ESC, driven as a servo output through M280. There is
//! no closed-loop speed control, so requested speeds are only noted.

use crate::dialect::{DialectConfig, MachineDescriptor, MachineScope, WritePolicy};
use crate::model::Point3D;
use crate::post::{MacroLine, PostProcessor};

const ESC_OFF: &str = "M280 S-90 P0 F3000 R";
const ESC_ON: &str = "M280 S90 P0 F3000 R";

pub struct RedeemPost;

impl PostProcessor for RedeemPost {
    fn name(&self) -> &str {
        "redeem"
    }

    fn revision(&self) -> &str {
        "0.0.2"
    }

    fn config(&self) -> DialectConfig {
        DialectConfig {
            show_editor: true,
            label_comments: false,
            preamble: "G17 G91\n".to_string(),
            postamble: "M05\nG00 X0.0 Y0.0\nG17 G91\nM2\n".to_string(),
            machine: MachineDescriptor::new("Redeem")
                .with_travel(Point3D::new(0.0, 0.0, 0.0), Point3D::new(300.0, 300.0, 30.0)),
            write_policy: WritePolicy::Edited,
            machine_scope: MachineScope::TopLevel,
            ..DialectConfig::default()
        }
    }

    // Rapids run at machine speed
    fn suppresses_feed(&self, mnemonic: &str) -> bool {
        matches!(mnemonic, "G0" | "G00")
    }

    // Only whole revolutions are announced
    fn has_spindle_speed(&self, speed: f64) -> bool {
        speed.trunc() != 0.0
    }

    fn spindle_speed(&self, rpm: i64) -> Vec<MacroLine> {
        vec![
            MacroLine::remark("set spindle speed"),
            MacroLine::code(format!("(spindle speed {} ignored)", rpm)),
        ]
    }

    fn spindle_on(&self) -> Vec<MacroLine> {
        vec![
            MacroLine::remark("turn spindle on"),
            // Signal off first so the ESC wakes up and arms
            MacroLine::code(ESC_OFF),
            MacroLine::code("G4 S1"),
            MacroLine::code(ESC_ON),
            // Spin-up time
            MacroLine::code("G4 S2"),
        ]
    }

    fn spindle_off(&self) -> Vec<MacroLine> {
        vec![
            MacroLine::remark("turn spindle off"),
            // Let the last motion finish before stopping
            MacroLine::code("G4 S3"),
            MacroLine::code(ESC_OFF),
        ]
    }
}
