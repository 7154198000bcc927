//! pathpost - tool-path post-processor
//!
//! Turns a tree of abstract tool-path commands into G-code for a specific
//! controller. The pipeline is: validate the selection, resolve the machine,
//! render with the controller's dialect, then review and write.
//!
//! ```no_run
//! use pathpost::{export, model::{Command, PathNode}, post::PostProcessorType};
//!
//! let job = vec![PathNode::leaf("Profile", vec![
//!     Command::new("G1").with("X", 10.0).with("F", 300.0),
//! ])];
//! let gcode = export(&job, &"-".into(), "--no-header", PostProcessorType::ShopBot)?;
//! # Ok::<(), pathpost::ExportError>(())
//! ```

pub mod codegen;
pub mod dialect;
pub mod lexer;
pub mod machine;
pub mod model;
pub mod output;
pub mod post;
pub mod validator;

use codegen::{CodeGenerator, GenerateError};
use dialect::{DialectConfig, DialectOverrides};
use model::PathNode;
use output::{CommitError, Destination, Reviewer};
use post::{PostProcessor, PostProcessorType};
use thiserror::Error;
use validator::ValidationError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rendering could not finish, e.g. the line counter ran out
    #[error(transparent)]
    Generate(GenerateError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

impl From<GenerateError> for ExportError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::Validation(v) => ExportError::Validation(v),
            other => ExportError::Generate(other),
        }
    }
}

/// One export run: a dialect, its per-run configuration and an optional reviewer
pub struct Exporter<'r> {
    post: Box<dyn PostProcessor>,
    config: DialectConfig,
    timestamp: Option<String>,
    reviewer: Option<&'r mut dyn Reviewer>,
}

impl<'r> Exporter<'r> {
    pub fn new(post: PostProcessorType) -> Self {
        Self::with_processor(post.get_processor())
    }

    pub fn with_processor(post: Box<dyn PostProcessor>) -> Self {
        let config = post.config();
        Self {
            post,
            config,
            timestamp: None,
            reviewer: None,
        }
    }

    /// Apply `--header`/`--no-comments`/... toggles
    pub fn args(mut self, args: &str) -> Self {
        self.config.apply_args(args);
        self
    }

    pub fn overrides(mut self, overrides: DialectOverrides) -> Self {
        overrides.apply(&mut self.config);
        self
    }

    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DialectConfig {
        &mut self.config
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    /// Used when the config asks for the editor
    pub fn reviewer(mut self, reviewer: &'r mut dyn Reviewer) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// Render `objects` and hand the result to `destination`. Returns the
    /// final (possibly reviewed) text. Nothing is written if rendering fails.
    pub fn export(self, objects: &[PathNode], destination: &Destination) -> Result<String, ExportError> {
        let mut gen = CodeGenerator::new(self.post.as_ref(), self.config.clone());
        if let Some(ts) = &self.timestamp {
            gen = gen.with_timestamp(ts);
        }
        let rendered = gen.generate(objects)?;

        let reviewer = if self.config.show_editor {
            if self.reviewer.is_none() {
                tracing::debug!("editor requested but no reviewer attached, skipping review");
            }
            self.reviewer
        } else {
            None
        };

        let committed = output::commit(rendered, destination, reviewer, self.config.write_policy)?;
        Ok(committed.text)
    }
}

/// Export with a built-in dialect, no interactive review
pub fn export(
    objects: &[PathNode],
    destination: &Destination,
    args: &str,
    post: PostProcessorType,
) -> Result<String, ExportError> {
    Exporter::new(post).args(args).export(objects, destination)
}

/// Initialize tracing to stderr. `RUST_LOG` overrides the INFO default.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    Ok(())
}
