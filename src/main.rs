use anyhow::{Context, Result};
use clap::Parser;
use pathpost::dialect::DialectOverrides;
use pathpost::model::PathNode;
use pathpost::output::{Destination, ExternalEditor};
use pathpost::post::PostProcessorType;
use pathpost::{init_logging, Exporter};
use std::path::PathBuf;

/// Post-process a tool-path job into controller G-code
#[derive(Parser, Debug)]
#[command(name = "pathpost", version, about)]
struct Cli {
    /// Job file: JSON array of path objects
    job: PathBuf,

    /// Output file, or "-" to print to stdout without writing
    #[arg(default_value = "-")]
    output: String,

    /// Target controller (shopbot, redeem)
    #[arg(short, long, default_value_t = PostProcessorType::ShopBot)]
    dialect: PostProcessorType,

    /// JSON file with configuration overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Post-processor arguments, e.g. "--no-header --line-numbers"
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    args: String,
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.job)
        .with_context(|| format!("failed to read job {}", cli.job.display()))?;
    let objects: Vec<PathNode> = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse job {}", cli.job.display()))?;

    let mut editor = ExternalEditor::default();
    let mut exporter = Exporter::new(cli.dialect);
    if let Some(path) = &cli.config {
        let overrides = DialectOverrides::from_file(path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?;
        exporter = exporter.overrides(overrides);
    }
    let exporter = exporter.args(&cli.args).reviewer(&mut editor);

    let destination = Destination::parse(&cli.output);
    let gcode = exporter.export(&objects, &destination)?;

    if destination == Destination::Discard {
        print!("{}", gcode);
    }

    Ok(())
}
