//! Post-processors for machine-specific G-code output
//!
//! The renderer is dialect-agnostic. Each controller supplies its default
//! configuration and the literal lines its macros expand to.

use crate::dialect::DialectConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod redeem;
pub mod shopbot;

/// One line produced by a macro expansion
#[derive(Debug, Clone, PartialEq)]
pub enum MacroLine {
    /// Controller code, always emitted and line-numbered
    Code(String),
    /// `(text)`, line-numbered, only when comments are enabled
    Comment(String),
    /// `(text)` without a line number, only when comments are enabled
    Remark(String),
}

impl MacroLine {
    pub fn code(s: impl Into<String>) -> Self {
        MacroLine::Code(s.into())
    }

    pub fn comment(s: impl Into<String>) -> Self {
        MacroLine::Comment(s.into())
    }

    pub fn remark(s: impl Into<String>) -> Self {
        MacroLine::Remark(s.into())
    }
}

/// Post-processor trait - implemented for each controller type
pub trait PostProcessor {
    /// Controller name, printed in the header
    fn name(&self) -> &str;

    fn revision(&self) -> &str;

    /// Defaults for this controller; callers layer arguments and overrides on a clone
    fn config(&self) -> DialectConfig;

    /// Whether the feed word is dropped for this mnemonic
    fn suppresses_feed(&self, _mnemonic: &str) -> bool {
        false
    }

    /// Lines replacing a tool change
    fn tool_change(&self) -> Vec<MacroLine> {
        vec![MacroLine::comment("toolchange ignored")]
    }

    /// Whether an `S` word counts as a requested spindle speed
    fn has_spindle_speed(&self, speed: f64) -> bool {
        speed != 0.0
    }

    /// Lines setting a requested spindle speed
    fn spindle_speed(&self, rpm: i64) -> Vec<MacroLine>;

    fn spindle_on(&self) -> Vec<MacroLine>;

    fn spindle_off(&self) -> Vec<MacroLine>;
}

/// Available post-processors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostProcessorType {
    /// ShopBot mill (direct spindle control)
    #[default]
    ShopBot,
    /// Redeem/Replicape with an ESC-driven brushless spindle
    Redeem,
}

impl PostProcessorType {
    /// Get the post-processor implementation
    pub fn get_processor(&self) -> Box<dyn PostProcessor> {
        match self {
            PostProcessorType::ShopBot => Box::new(shopbot::ShopBotPost),
            PostProcessorType::Redeem => Box::new(redeem::RedeemPost),
        }
    }
}

impl FromStr for PostProcessorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shopbot" | "shopbotgcode" => Ok(PostProcessorType::ShopBot),
            "redeem" | "replicape" => Ok(PostProcessorType::Redeem),
            other => Err(format!("unknown post-processor '{}' (expected shopbot or redeem)", other)),
        }
    }
}

impl std::fmt::Display for PostProcessorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostProcessorType::ShopBot => write!(f, "shopbot"),
            PostProcessorType::Redeem => write!(f, "redeem"),
        }
    }
}
