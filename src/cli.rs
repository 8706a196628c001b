// ============================================================================
// PixelFE CLI: headless import/export and JMH result summaries
// ============================================================================
//
// Usage examples:
//   PixelFE --input logo.png --size 32 --format svg --output logo.svg
//   PixelFE -i icons/*.png --size 16 --format png --scale 8 --output-dir out/
//   PixelFE -i badge.png --format markdown --copy
//   PixelFE --jmh results.json --sort-metric score --sort-order desc

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use crate::canvas::PixelGrid;
use crate::io::{self, ExportFormat};
use crate::jmh::{self, SortMetric, SortOrder};
use crate::settings::EditorSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PixelFE headless pixel-art converter.
#[derive(Parser, Debug)]
#[command(
    name = "PixelFE",
    about = "PixelFE headless pixel-art converter",
    long_about = "Import images onto a pixel grid and export them as SVG, PNG, PNG data\n\
                  URIs, Markdown/HTML image markup or block art, without opening an editor.\n\
                  Also summarizes JMH benchmark result files.\n\n\
                  Example:\n  \
                  PixelFE --input logo.png --size 32 --format svg --output logo.svg\n  \
                  PixelFE --jmh results.json --sort-order desc"
)]
pub struct CliArgs {
    /// Input image file(s). Glob patterns accepted (e.g. "*.png", "icons/*.jpg").
    #[arg(short, long, num_args = 1.., required_unless_present = "jmh")]
    pub input: Vec<String>,

    /// Grid edge in cells. Defaults to the saved editor setting.
    #[arg(short, long, value_name = "N")]
    pub size: Option<u32>,

    /// Output format: svg, png, data-uri, markdown, html, blocks.
    /// When omitted, inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Pixels per cell for raster output, user units per cell for SVG.
    #[arg(long, value_name = "1-64")]
    pub scale: Option<u32>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Put text output on the system clipboard instead of writing a file.
    #[arg(long)]
    pub copy: bool,

    /// JMH results JSON to summarize.
    #[arg(long, value_name = "RESULTS.json", conflicts_with = "input")]
    pub jmh: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = MetricArg::Score)]
    pub sort_metric: MetricArg,

    #[arg(long, value_enum, default_value_t = OrderArg::Original)]
    pub sort_order: OrderArg,

    /// Print per-file timing and debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Score,
    Throughput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Original,
    Asc,
    Desc,
}

impl From<MetricArg> for SortMetric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Score => SortMetric::Score,
            MetricArg::Throughput => SortMetric::Throughput,
        }
    }
}

impl From<OrderArg> for SortOrder {
    fn from(o: OrderArg) -> Self {
        match o {
            OrderArg::Original => SortOrder::Original,
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    if let Some(path) = &args.jmh {
        return match run_jmh(path, args.sort_metric.into(), args.sort_order.into()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let settings = EditorSettings::load();
    let size = args.size.unwrap_or(settings.default_grid_size);
    let scale = args.scale.unwrap_or(settings.export_scale).clamp(1, 64);
    let format = match parse_format(args.format.as_deref(), args.output.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.copy && !format.is_text() {
        eprintln!("error: --copy needs a text format (svg, data-uri, markdown, html, blocks).");
        return ExitCode::FAILURE;
    }

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let target = if args.copy {
            Target::Clipboard
        } else {
            match build_output_path(
                input_path,
                args.output.as_deref(),
                args.output_dir.as_deref(),
                format,
            ) {
                Some(p) => Target::File(p),
                None => {
                    eprintln!(
                        "  error: cannot determine output path for '{}'.",
                        input_path.display()
                    );
                    any_failure = true;
                    continue;
                }
            }
        };

        match run_one(input_path, &target, size, format, scale, settings.import_alpha_threshold) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        target,
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log::error!("{}: {}", input_path.display(), e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

enum Target {
    File(PathBuf),
    Clipboard,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::File(p) => write!(f, "{}", p.display()),
            Target::Clipboard => f.write_str("clipboard"),
        }
    }
}

fn run_one(
    input: &Path,
    target: &Target,
    size: u32,
    format: ExportFormat,
    scale: u32,
    alpha_threshold: u8,
) -> Result<(), String> {
    // -- Step 1: Import --------------------------------------------------
    let mut grid = PixelGrid::new(size).map_err(|e| e.to_string())?;
    io::read_image_file(input, &mut grid, alpha_threshold)
        .map_err(|e| format!("import failed: {}", e))?;

    // -- Step 2: Export --------------------------------------------------
    match target {
        Target::File(path) => io::write_export(path, format, &grid, scale)
            .map_err(|e| format!("export failed: {}", e))?,
        Target::Clipboard => {
            let text = io::render_text(&grid, format, scale)
                .map_err(|e| format!("export failed: {}", e))?
                .ok_or_else(|| "PNG output cannot be copied as text".to_string())?;
            io::copy_text_to_clipboard(&text).map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

fn run_jmh(path: &Path, metric: SortMetric, order: SortOrder) -> Result<(), String> {
    let records = jmh::load_results(path).map_err(|e| e.to_string())?;
    if records.is_empty() {
        println!("No benchmark results in '{}'.", path.display());
        return Ok(());
    }
    for group in jmh::group_by_class(&records) {
        print!("{}", format_group_table(&group, metric, order));
    }
    Ok(())
}

/// Text table for one benchmark class.
pub fn format_group_table(group: &jmh::BenchmarkGroup, metric: SortMetric, order: SortOrder) -> String {
    let rows = jmh::sort_benchmarks(&group.benchmarks, metric, order);
    let label_w = rows
        .iter()
        .map(|r| r.label().chars().count())
        .max()
        .unwrap_or(0)
        .max("Benchmark".len());

    let mut out = String::new();
    out.push_str(&format!(
        "== {} (JMH {}, {}) ==\n",
        group.class_name,
        group.environment.jmh_version.as_deref().unwrap_or("?"),
        group.environment.jdk_version.as_deref().unwrap_or("unknown JDK"),
    ));
    out.push_str(&format!(
        "{:<label_w$}  {:>14}  {:>12}  {:<10}  {:<6}  {:>7}\n",
        "Benchmark", "Score", "Error", "Unit", "Mode", "Threads"
    ));
    for r in &rows {
        let score = r
            .primary_metric
            .score
            .map_or_else(|| "NaN".to_string(), |s| format!("{:.3}", s));
        let error = r
            .primary_metric
            .score_error
            .map_or_else(|| "-".to_string(), |e| format!("± {:.3}", e));
        out.push_str(&format!(
            "{:<label_w$}  {:>14}  {:>12}  {:<10}  {:<6}  {:>7}\n",
            r.label(),
            score,
            error,
            r.primary_metric.score_unit,
            r.mode,
            r.threads
        ));
    }
    out.push('\n');
    out
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated list, in the
/// order given.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let literal = Path::new(pattern);
        if literal.exists() {
            push_unique(&mut result, literal.to_path_buf());
            continue;
        }
        match glob::glob(pattern) {
            Ok(entries) => {
                let before = result.len();
                for entry in entries.flatten() {
                    push_unique(&mut result, entry);
                }
                if result.len() == before {
                    log::warn!("pattern '{}' matched no files", pattern);
                }
            }
            Err(e) => log::warn!("invalid glob '{}': {}", pattern, e),
        }
    }

    result
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

/// Choose the [`ExportFormat`] from `--format` or infer it from the output
/// file extension. Defaults to PNG when neither is known.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> Result<ExportFormat, String> {
    if let Some(f) = format_arg {
        return f.parse();
    }
    Ok(output
        .and_then(|out| out.extension())
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::from_extension)
        .unwrap_or_default())
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: ExportFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));

    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}
