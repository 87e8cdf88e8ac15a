use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use log::{debug, info, warn};
use voxcritter_core::{
    CreatureReport, DecodeOptions, GeometryPolicy, LoadOptions, PixelSource, PngFileSource,
    StopRule, decode_with, embed_payload, load_creature, make_report, write_png,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VOXCRITTER_BUILD_COMMIT"),
    " ",
    env!("VOXCRITTER_BUILD_DATE"),
    ")"
);

const NO_PAYLOAD_EXIT: u8 = 3;
const ERROR_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "voxcritter")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Recover voxel creatures hidden in voxel-painter PNG images.",
    long_about = None,
    after_help = "Examples:\n  voxcritter inspect critter.png -o critter.json\n  voxcritter inspect critter.png --stdout --pretty --grid\n  voxcritter embed carrier.png chunks.txt -o critter.png"
)]
struct Cli {
    /// Log decode milestones (debug level); RUST_LOG is also honoured
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode the creature hidden in a PNG and write a JSON report.
    #[command(
        after_help = "Exit codes:\n  0  report written\n  2  error\n  3  image carries no voxel-painter payload"
    )]
    Inspect {
        /// Path (or glob matching one file) to a .png image
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Include the dense grid summary
        #[arg(long)]
        grid: bool,

        /// Treat a payload without geometry as an empty creature
        #[arg(long)]
        allow_empty: bool,

        /// Read exactly this many characters instead of stopping at NUL
        #[arg(long, value_name = "CHARS")]
        length: Option<usize>,

        /// Read pixels as stored instead of flattening translucency onto white
        #[arg(long)]
        keep_alpha: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
    /// Hide voxel-painter chunk text in a copy of a carrier PNG.
    Embed {
        /// Carrier .png image
        carrier: PathBuf,

        /// Text file holding the chunk payload (e.g. `C=ff0000:A=wh`)
        payload: PathBuf,

        /// Output .png path
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    NoPayload,
}

struct InspectArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    grid: bool,
    options: LoadOptions,
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let result = match cli.command {
        Commands::Inspect {
            input,
            report,
            stdout,
            pretty,
            compact,
            grid,
            allow_empty,
            length,
            keep_alpha,
            quiet,
        } => {
            let options = LoadOptions {
                stop: length.map_or(StopRule::default(), StopRule::Length),
                decode: DecodeOptions {
                    geometry: if allow_empty {
                        GeometryPolicy::Empty
                    } else {
                        GeometryPolicy::Reject
                    },
                },
                flatten_alpha: !keep_alpha,
            };
            cmd_inspect(InspectArgs {
                input,
                report,
                stdout,
                pretty,
                compact,
                grid,
                options,
                quiet,
            })
        }
        Commands::Embed {
            carrier,
            payload,
            output,
            quiet,
        } => cmd_embed(&carrier, &payload, &output, quiet).map(|()| Outcome::Done),
    };

    match result {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::NoPayload) => ExitCode::from(NO_PAYLOAD_EXIT),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(ERROR_EXIT)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line.
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_inspect(args: InspectArgs) -> Result<Outcome, CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_png_file(&resolved_input)?;
    let report = if args.stdout {
        None
    } else {
        let report = args.report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        ensure_distinct_output(&resolved_input, &report)?;
        Some(report)
    };

    let source = PngFileSource::open(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    let input_bytes = source.file_len();
    let creature = load_creature(source, &args.options).map_err(|err| {
        CliError::new(
            format!("{}: {err}", resolved_input.display()),
            Some("the image may be damaged or re-encoded lossily".to_string()),
        )
    })?;

    let Some(creature) = creature else {
        if !args.quiet {
            eprintln!(
                "no voxel-painter payload in {}",
                resolved_input.display()
            );
        }
        return Ok(Outcome::NoPayload);
    };
    info!(
        "{} voxels, {} palette entries",
        creature.voxels.len(),
        creature.palette.len()
    );

    let rep = make_report(
        &resolved_input.display().to_string(),
        input_bytes,
        &creature,
        args.grid,
    );
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    let Some(report) = report else {
        print!("{}", json);
        return Ok(Outcome::Done);
    };
    create_parent_dir(&report)?;
    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !args.quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    Ok(Outcome::Done)
}

fn cmd_embed(carrier: &Path, payload: &Path, output: &Path, quiet: bool) -> Result<(), CliError> {
    let carrier = resolve_input_path(carrier)?;
    validate_png_file(&carrier)?;
    ensure_distinct_output(&carrier, output)?;

    let text = fs::read_to_string(payload)
        .with_context(|| format!("Failed to read payload file: {}", payload.display()))?;
    let chunks = text.trim_end_matches(['\r', '\n']);
    let creature = decode_with(chunks, &DecodeOptions::default()).map_err(|err| {
        CliError::new(
            format!("payload does not decode: {err}"),
            Some("expected chunk text such as C=ff0000:A=wh".to_string()),
        )
    })?;
    debug!("payload holds {} voxels", creature.voxels.len());

    let mut frame = PngFileSource::open(&carrier)
        .and_then(|mut source| source.read_pixels())
        .with_context(|| format!("Failed to read carrier: {}", carrier.display()))?;
    if frame.rgba().chunks_exact(4).any(|pixel| pixel[3] != u8::MAX) {
        warn!(
            "{} has translucent pixels; inspect the result with --keep-alpha",
            carrier.display()
        );
    }
    let bits = embed_payload(frame.rgba_mut(), chunks, StopRule::default()).map_err(|err| {
        CliError::new(
            format!("cannot embed payload: {err}"),
            Some("use a larger carrier image".to_string()),
        )
    })?;

    create_parent_dir(output)?;
    write_png(output, &frame)
        .with_context(|| format!("Failed to write image: {}", output.display()))?;
    if !quiet {
        eprintln!(
            "OK: {} bits embedded -> {}",
            bits,
            output.display()
        );
    }
    Ok(())
}

fn serialize_report(rep: &CreatureReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn ensure_distinct_output(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let Some(parent) = output.parent() else {
        return Ok(());
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    // A missing output directory cannot hold the input.
    let Ok(output_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    if output_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    Ok(())
}

fn validate_png_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .png file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .png file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "png" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .png file; lossy formats destroy the payload".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single image, or run once per file".to_string()),
        ));
    }
    matches.pop().ok_or_else(|| {
        CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .png".to_string()),
        )
    })
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
