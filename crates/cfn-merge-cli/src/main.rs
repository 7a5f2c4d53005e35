use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use cfn_merge::batch::{self, BatchMerge, OutputFormat};
use cfn_merge::{Classification, ClassificationConfig, FragmentMerger};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Merge CloudFormation and Serverless template fragments
#[derive(Parser, Debug)]
#[command(name = "cfn-merge")]
#[command(version, about = "Merge CloudFormation template fragments", long_about = None)]
struct Cli {
    /// Classification file extending the default merge tables
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge fragments into a base template, in the order given
    Files {
        /// Base template
        base: PathBuf,

        /// Fragments to merge into the base; directories expand to the
        /// templates they contain, in path order
        #[arg(required = true)]
        fragments: Vec<PathBuf>,

        /// Write output to FILE instead of stdout
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (defaults to the output file extension, or YAML)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Merge every template under SOURCE into its counterpart under TARGET
    Dir {
        source: PathBuf,
        target: PathBuf,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cfn_merge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let merger = FragmentMerger::new(load_classification(cli.config.as_deref())?);

    match cli.command {
        Commands::Files {
            base,
            fragments,
            output,
            format,
        } => merge_files(&merger, &base, &fragments, output.as_deref(), format),
        Commands::Dir {
            source,
            target,
            dry_run,
        } => merge_dir(&merger, &source, &target, dry_run),
    }
}

fn load_classification(path: Option<&Path>) -> Result<Classification> {
    let Some(path) = path else {
        return Ok(Classification::default());
    };
    debug!(config = %path.display(), "loading classification");
    let config = ClassificationConfig::load(path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))?;
    Ok(config.into_classification())
}

fn merge_files(
    merger: &FragmentMerger,
    base: &Path,
    fragments: &[PathBuf],
    output: Option<&Path>,
    format: Option<FormatArg>,
) -> Result<()> {
    let fragments = batch::expand_fragments(fragments).context("Failed to list fragments")?;
    let merged = BatchMerge::new(merger)
        .merge_files(base, &fragments)
        .with_context(|| format!("Failed to merge into {}", base.display()))?;

    match output {
        Some(path) => {
            let format = format.map_or_else(|| OutputFormat::from_path(path), Into::into);
            batch::write_document(path, &merged, format)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
        }
        None => {
            let format = format.map_or_else(OutputFormat::default, Into::into);
            let rendered = batch::render_document(&merged, format);
            std::io::stdout()
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn merge_dir(merger: &FragmentMerger, source: &Path, target: &Path, dry_run: bool) -> Result<()> {
    let report = BatchMerge::new(merger)
        .dry_run(dry_run)
        .merge_directory(source, target)
        .with_context(|| {
            format!(
                "Failed to merge {} into {}",
                source.display(),
                target.display()
            )
        })?;

    if report.is_empty() {
        println!("Nothing to merge in {}", source.display());
        return Ok(());
    }

    let prefix = if dry_run { "would " } else { "" };
    for path in &report.merged {
        println!("  {}merge {}", prefix, path.display());
    }
    for path in &report.copied {
        println!("  {}copy  {}", prefix, path.display());
    }
    println!(
        "{} merged, {} copied",
        report.merged.len(),
        report.copied.len()
    );
    Ok(())
}
