//! PDF redaction CLI.
//!
//! Thin front end over the `pagemask` library: argument parsing, input
//! sniffing and file I/O. By default it redacts; subcommands draw a
//! calibration grid, list what would be redacted, or dump page text.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use pagemask::{
    Color, ExplicitRegion, GridOptions, Mode, Origin, RedactionConfig, RedactionService,
    SearchPattern,
};

/// Prefix of the default output file name.
const OUTPUT_PREFIX: &str = "Redacted_";

/// PDF Redaction Tool
///
/// Cover or remove regions, text and bottom-of-page images in PDF
/// documents. Regions are given against a reference page size and scaled
/// onto every page.
#[derive(Parser)]
#[command(name = "pagemask")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input PDF file path
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file path (defaults to Redacted_<input name> next to the input)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    targets: TargetArgs,

    /// Destructive removes the content, overlay only paints over it
    #[arg(short, long, value_name = "MODE")]
    mode: Option<Mode>,

    /// Fill colour as r,g,b with components in [0, 1]
    #[arg(long, value_name = "R,G,B")]
    fill: Option<Color>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// What to look for.
#[derive(Args, Default)]
struct TargetArgs {
    /// Text to redact (can be specified multiple times)
    #[arg(short, long, value_name = "TEXT")]
    text: Vec<String>,

    /// Match --text regardless of case
    #[arg(long)]
    ignore_case: bool,

    /// Region authored against a reference page, x,y,w,h@W,H (can be
    /// specified multiple times)
    #[arg(short, long, value_name = "X,Y,W,H@W,H")]
    region: Vec<ExplicitRegion>,

    /// Region coordinates are measured from the top-left corner
    #[arg(long)]
    top_left: bool,

    /// Redact images lying below this fraction of the page height
    #[arg(long, value_name = "FRACTION")]
    images_below: Option<f64>,

    /// JSON job file; command-line targets are added to it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a labelled coordinate grid over every page
    Grid {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Distance between grid lines, in points
        #[arg(long, default_value_t = 10.0)]
        step: f64,

        /// Every n-th line is a labelled major line
        #[arg(long, default_value_t = 5)]
        major: u32,
    },

    /// List the rectangles that would be redacted, per page
    Find {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Extract text from a PDF (for debugging and verification)
    Extract {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Command handler owning the redaction service.
struct RedactionHandler {
    service: RedactionService,
    verbose: bool,
}

impl RedactionHandler {
    fn new(verbose: bool) -> Self {
        Self {
            service: RedactionService::new(),
            verbose,
        }
    }

    /// Executes a redaction operation.
    fn redact(&self, input: &Path, output: &Path, config: &RedactionConfig) -> Result<()> {
        if config.is_empty() {
            anyhow::bail!(
                "No redaction targets specified. Use --text, --region, --images-below or --config."
            );
        }
        let bytes = read_pdf(input)?;

        if self.verbose {
            println!("Input:  {}", input.display());
            println!("Output: {}", output.display());
            println!("Mode:   {}", config.mode);
        }

        let (redacted, report) = self
            .service
            .process_with_report(&bytes, config)
            .with_context(|| format!("Redaction of {} failed", input.display()))?;
        std::fs::write(output, redacted)
            .with_context(|| format!("Failed to write to {}", output.display()))?;

        if self.verbose {
            println!("\nRedaction Summary:");
            println!("  Pages processed: {}", report.pages_processed);
            println!("  Pages modified:  {}", report.pages_modified);
            println!("  Targets painted: {}", report.targets_painted);
            println!("  Glyphs removed:  {}", report.glyphs_removed);
            println!("  Images removed:  {}", report.images_removed);
            println!(
                "  Secure: {}",
                if report.secure {
                    "Yes"
                } else {
                    "No (visual only)"
                }
            );
        }

        if report.has_redactions() {
            println!(
                "✓ Successfully redacted {} region(s) → {}",
                report.targets_painted,
                output.display()
            );
        } else {
            println!("⚠ Nothing found to redact, wrote an unchanged copy → {}", output.display());
        }
        Ok(())
    }

    /// Draws a calibration grid.
    fn grid(&self, input: &Path, output: &Path, options: &GridOptions) -> Result<()> {
        let bytes = read_pdf(input)?;
        let gridded = self
            .service
            .calibrate(&bytes, options)
            .with_context(|| "Drawing the calibration grid failed")?;
        std::fs::write(output, gridded)
            .with_context(|| format!("Failed to write to {}", output.display()))?;
        println!("✓ Calibration grid → {}", output.display());
        Ok(())
    }

    /// Prints what a redaction would cover.
    fn find(&self, input: &Path, config: &RedactionConfig) -> Result<()> {
        if config.is_empty() {
            anyhow::bail!("Nothing to find. Use --text, --region, --images-below or --config.");
        }
        let bytes = read_pdf(input)?;
        let plans = self
            .service
            .locate(&bytes, config)
            .with_context(|| "Locating targets failed")?;

        if plans.is_empty() {
            println!("⚠ No matches");
            return Ok(());
        }
        for plan in &plans {
            println!("Page {}:", plan.page + 1);
            for target in &plan.targets {
                let r = target.rect;
                println!(
                    "  {:<24} x={:.2} y={:.2} w={:.2} h={:.2}",
                    target.source.to_string(),
                    r.x,
                    r.y,
                    r.width,
                    r.height
                );
            }
        }
        Ok(())
    }

    /// Extracts text from a PDF.
    fn extract(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }

        let text = self
            .service
            .extract_text(input)
            .with_context(|| "Text extraction failed")?;

        if let Some(output_path) = output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Extracted {} characters → {}",
                text.len(),
                output_path.display()
            );
        } else {
            println!("{}", text);
        }

        Ok(())
    }
}

/// Reads `path`, accepting only PDF documents.
fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if pagemask::pdf::header_offset(&bytes).is_none() {
        anyhow::bail!("PDF files only: {} is not a PDF document", path.display());
    }
    Ok(bytes)
}

/// `Redacted_<name>` in the input's directory.
fn default_output(input: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Input path has no file name: {}", input.display()))?;
    let mut output_name = std::ffi::OsString::from(OUTPUT_PREFIX);
    output_name.push(name);
    Ok(input.with_file_name(output_name))
}

/// Builds the job configuration from an optional file plus flags.
fn build_config(
    targets: &TargetArgs,
    mode: Option<Mode>,
    fill: Option<Color>,
) -> Result<RedactionConfig> {
    let mut config = match &targets.config {
        Some(path) => RedactionConfig::from_path(path)
            .with_context(|| format!("Invalid job file {}", path.display()))?,
        None => RedactionConfig::default(),
    };

    let origin = if targets.top_left {
        Origin::TopLeft
    } else {
        Origin::BottomLeft
    };
    config
        .regions
        .extend(targets.region.iter().map(|region| region.with_origin(origin)));
    config.text_patterns.extend(targets.text.iter().map(|text| {
        let pattern = SearchPattern::new(text.as_str());
        if targets.ignore_case {
            pattern.case_insensitive()
        } else {
            pattern
        }
    }));
    if let Some(threshold) = targets.images_below {
        config.bottom_image_threshold = Some(threshold);
    }
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(fill) = fill {
        config.fill = fill;
    }

    config.validate().with_context(|| "Invalid redaction options")?;
    Ok(config)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let handler = RedactionHandler::new(cli.verbose);

    match &cli.command {
        Some(Commands::Grid {
            input,
            output,
            step,
            major,
        }) => {
            let options = GridOptions {
                step: *step,
                major_every: *major,
                ..GridOptions::default()
            };
            handler.grid(input, output, &options)?;
        }
        Some(Commands::Find { input, targets }) => {
            let config = build_config(targets, None, None)?;
            handler.find(input, &config)?;
        }
        Some(Commands::Extract { input, output }) => {
            handler.extract(input, output.as_deref())?;
        }
        None => {
            // Default: redaction mode
            let input = cli
                .input
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--input is required"))?;
            let output = match &cli.output {
                Some(output) => output.clone(),
                None => default_output(input)?,
            };
            let config = build_config(&cli.targets, cli.mode, cli.fill)?;
            handler.redact(input, &output, &config)?;
        }
    }

    Ok(())
}
