//! G-code generator
//! Walks the object tree and renders each command in the selected dialect

use crate::dialect::{DialectConfig, MacroKind, MessagePolicy};
use crate::machine;
use crate::model::{Command, Param, ParamValue, PathNode};
use crate::post::{MacroLine, PostProcessor};
use crate::validator::{ValidationError, Validator};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("line number overflow after N{last} (step {step})")]
    LineNumberOverflow { last: u32, step: u32 },
}

/// Rendered lines plus the running line number
#[derive(Debug, Clone, PartialEq)]
pub struct GCodeOutput {
    pub lines: Vec<String>,
    pub line_number: u32,
    pub step: u32,
    pub numbered: bool,
    /// Set once the counter can no longer advance
    pub overflowed: bool,
}

/// Position in the output a path can be rolled back to
#[derive(Debug, Clone, Copy)]
struct Mark {
    len: usize,
    line_number: u32,
}

impl GCodeOutput {
    pub fn new(start: u32, step: u32, numbered: bool) -> Self {
        Self {
            lines: Vec::new(),
            line_number: start,
            step,
            numbered,
            overflowed: false,
        }
    }

    fn prefix(&mut self) -> String {
        if !self.numbered {
            return String::new();
        }
        match self.line_number.checked_add(self.step) {
            Some(n) => self.line_number = n,
            None => self.overflowed = true,
        }
        format!("N{} ", self.line_number)
    }

    /// Push one line, numbered when enabled
    pub fn emit(&mut self, code: &str) {
        let prefix = self.prefix();
        self.lines.push(format!("{}{}", prefix, code));
    }

    pub fn emit_comment(&mut self, comment: &str) {
        self.emit(&format!("({})", comment));
    }

    /// Comment that never takes a line number
    pub fn emit_remark(&mut self, comment: &str) {
        self.lines.push(format!("({})", comment));
    }

    fn mark(&self) -> Mark {
        Mark {
            len: self.lines.len(),
            line_number: self.line_number,
        }
    }

    fn rollback(&mut self, mark: Mark) {
        self.lines.truncate(mark.len);
        self.line_number = mark.line_number;
    }
}

impl std::fmt::Display for GCodeOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

pub struct CodeGenerator<'a> {
    post: &'a dyn PostProcessor,
    config: DialectConfig,
    output: GCodeOutput,
    /// Mnemonic of the previous command in the current path
    last_command: Option<String>,
    timestamp: Option<String>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(post: &'a dyn PostProcessor, config: DialectConfig) -> Self {
        let output = GCodeOutput::new(
            config.line_start,
            config.line_step,
            config.output_line_numbers,
        );
        Self {
            post,
            config,
            output,
            last_command: None,
            timestamp: None,
        }
    }

    /// Fix the header's output time, e.g. for reproducible output
    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    pub fn output(&self) -> &GCodeOutput {
        &self.output
    }

    pub fn generate(&mut self, objects: &[PathNode]) -> Result<String, GenerateError> {
        Validator::new().validate_objects(objects)?;

        tracing::info!("postprocessing...");
        let resolved = machine::resolve(objects, &self.config);

        if self.config.output_header {
            self.emit_header();
        }

        if self.config.output_comments {
            self.output.emit_comment("begin preamble");
        }
        let preamble = self.config.preamble.clone();
        self.emit_block(&preamble);
        let units = resolved.unit_code(&self.config).to_string();
        self.output.emit(&units);

        for obj in objects {
            if self.config.output_comments {
                self.output
                    .emit_comment(&format!("begin operation: {}", obj.label()));
            }
            let pre = self.config.pre_operation.clone();
            self.emit_block(&pre);

            self.render_node(obj);

            if self.config.output_comments {
                self.output
                    .emit_comment(&format!("finish operation: {}", obj.label()));
            }
            let post = self.config.post_operation.clone();
            self.emit_block(&post);
        }

        if self.config.output_comments {
            self.output.emit_remark("begin postamble");
        }
        let postamble = self.config.postamble.clone();
        self.emit_block(&postamble);

        if self.output.overflowed {
            return Err(GenerateError::LineNumberOverflow {
                last: self.output.line_number,
                step: self.output.step,
            });
        }

        tracing::info!("done postprocessing");
        Ok(self.output.to_string())
    }

    fn emit_header(&mut self) {
        let timestamp = self.timestamp.clone().unwrap_or_else(|| {
            chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S%.6f")
                .to_string()
        });

        self.output
            .emit(&format!("(Exported by {})", env!("CARGO_PKG_NAME")));
        self.output.emit(&format!(
            "(Post Processor: {} {})",
            self.post.name(),
            self.post.revision()
        ));
        self.output.emit(&format!("(Output Time:{})", timestamp));
    }

    /// Literal text, one numbered line per source line
    fn emit_block(&mut self, block: &str) {
        for line in block.lines() {
            self.output.emit(line);
        }
    }

    fn emit_macro(&mut self, lines: Vec<MacroLine>) {
        for line in lines {
            match line {
                MacroLine::Code(code) => self.output.emit(&code),
                MacroLine::Comment(c) if self.config.output_comments => {
                    self.output.emit_comment(&c)
                }
                MacroLine::Remark(c) if self.config.output_comments => {
                    self.output.emit_remark(&c)
                }
                _ => {}
            }
        }
    }

    /// Render a group recursively, or a single path
    pub fn render_node(&mut self, node: &PathNode) {
        match node {
            PathNode::Group {
                label, children, ..
            } => {
                if self.config.output_comments && self.config.label_comments {
                    self.output.emit_comment(&format!("compound: {}", label));
                }
                for child in children {
                    self.render_node(child);
                }
            }
            // Stock and other non-path objects
            PathNode::Leaf { commands: None, .. } => {}
            PathNode::Leaf {
                label,
                commands: Some(commands),
                ..
            } => {
                let mark = self.output.mark();
                if self.config.output_comments && self.config.label_comments {
                    self.output.emit_comment(&format!("Path: {}", label));
                }

                self.last_command = None;
                for cmd in commands {
                    self.render_command(cmd, mark);
                }
            }
        }
    }

    fn render_command(&mut self, cmd: &Command, path_start: Mark) {
        let mut mnemonic = Some(cmd.name.as_str());
        if self.config.modal && self.last_command.as_deref() == Some(cmd.name.as_str()) {
            mnemonic = None;
        }

        let mut words: Vec<(Param, String)> = cmd
            .ordered_params()
            .filter(|(p, _)| !(*p == Param::F && self.post.suppresses_feed(&cmd.name)))
            .map(|(p, v)| (p, p.format(v)))
            .collect();

        for key in cmd.unknown_params() {
            tracing::debug!("dropping parameter {} of {}", key, cmd.name);
        }

        self.last_command = Some(cmd.name.clone());

        match self.config.macro_for(&cmd.name) {
            Some(MacroKind::ToolChange) => {
                mnemonic = None;
                if !words.is_empty() {
                    words.remove(0);
                }
                let block = self.config.tool_change.clone();
                self.emit_block(&block);
                self.emit_macro(self.post.tool_change());
            }
            Some(kind @ (MacroKind::SpindleOn | MacroKind::SpindleOff)) => {
                mnemonic = None;
                let speed = cmd
                    .get(Param::S)
                    .and_then(ParamValue::as_f64)
                    .filter(|s| self.post.has_spindle_speed(*s));
                if let Some(speed) = speed {
                    words.retain(|(p, _)| *p != Param::S);
                    self.emit_macro(self.post.spindle_speed(speed.trunc() as i64));
                }

                if kind == MacroKind::SpindleOff {
                    self.emit_macro(self.post.spindle_off());
                } else {
                    self.emit_macro(self.post.spindle_on());
                }
            }
            Some(MacroKind::Message) => {
                if !self.config.output_comments {
                    if self.config.message_policy == MessagePolicy::DiscardNode {
                        self.output.rollback(path_start);
                    }
                    return;
                }
                if !words.is_empty() {
                    let text: Vec<&str> = words.iter().map(|(_, w)| w.as_str()).collect();
                    self.output
                        .emit_comment(&text.join(&self.config.command_space));
                }
                return;
            }
            None => {}
        }

        let tokens: Vec<&str> = mnemonic
            .into_iter()
            .chain(words.iter().map(|(_, w)| w.as_str()))
            .collect();
        if !tokens.is_empty() {
            let line = tokens.join(&self.config.command_space);
            self.output.emit(line.trim_end());
        }
    }
}
