//! CLI binary for img2slides.
//!
//! A thin shim over the library crate that maps CLI flags to `DeckConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use img2slides::{
    compose, engine, list_pairs, DeckConfig, DeckProgressCallback, ProgressCallback, Renderer,
    SlidesError,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a bar over the slides, then a spinner for the
/// document-level phase (pdfium save or LaTeX passes).
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(SPINNER),
        );
        bar.set_prefix("Scanning");
        bar.set_message("matching filenames…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }
}

impl DeckProgressCallback for CliProgressCallback {
    fn on_deck_start(&self, total_slides: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} slides  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(SPINNER),
        );
        self.bar.set_length(total_slides as u64);
        self.bar.set_prefix("Preparing");
    }

    fn on_slide_complete(&self, _index: usize, _total: usize, title: &str) {
        self.bar.set_message(title.to_string());
        self.bar.inc(1);
    }

    fn on_slide_skipped(&self, file_name: &str, reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar
            .println(format!("  {} {file_name}: {}", yellow("⚠"), dim(reason)));
        self.bar.inc(1);
    }

    fn on_phase(&self, phase: &str) {
        self.bar.set_prefix("Emitting");
        self.bar.set_message(phase.to_string());
    }

    fn on_deck_complete(&self, _total: usize, _rendered: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Direct PDF (table layout), default output comparison.pdf
  img2slides runs/v1/plots runs/v2/plots

  # Beamer deck compiled with pdflatex
  img2slides --renderer beamer runs/v1/plots runs/v2/plots -o v1_vs_v2.pdf

  # Keep the LaTeX sources and compile them yourself
  img2slides --renderer beamer --latex-workdir build/deck --no-compile a/ b/

  # Only show which files would be paired
  img2slides --list-only a/ b/

MATCHING:
  Files named *.png, *.jpg, *.jpeg or *.gif (case-sensitive, non-recursive,
  dot-files ignored) that exist in both folders become one slide each, in
  sorted filename order. Slide titles come from the filename: extension
  dropped, '_' and '-' turned into spaces, words capitalised.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH          Path to an existing libpdfium — skips auto-download
  IMG2SLIDES_PDFIUM_CACHE  Override the pdfium cache directory
  RUST_LOG                 Override the log filter (e.g. img2slides=debug)
"#;

/// Build side-by-side comparison slides from two folders of images.
#[derive(Parser, Debug)]
#[command(
    name = "img2slides",
    version,
    about = "Build side-by-side comparison slides from two folders of images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// First image folder (left column).
    folder1: PathBuf,

    /// Second image folder (right column).
    folder2: PathBuf,

    /// Output PDF (default: comparison.pdf, or comparison_latex.pdf for beamer).
    #[arg(short, long, env = "IMG2SLIDES_OUTPUT")]
    output: Option<PathBuf>,

    /// Renderer: pdf (direct table layout) or beamer (LaTeX).
    #[arg(short, long, env = "IMG2SLIDES_RENDERER", value_enum, default_value = "pdf")]
    renderer: RendererArg,

    /// Image extensions to match, comma separated.
    #[arg(long, env = "IMG2SLIDES_EXTENSIONS", value_delimiter = ',',
          default_value = "png,jpg,jpeg,gif")]
    extensions: Vec<String>,

    /// Maximum image width in points (pdf renderer).
    #[arg(long, env = "IMG2SLIDES_MAX_WIDTH", default_value_t = 380.0)]
    max_width: f32,

    /// Maximum image height in points (pdf renderer).
    #[arg(long, env = "IMG2SLIDES_MAX_HEIGHT", default_value_t = 280.0)]
    max_height: f32,

    /// Pixels per point when resampling images (pdf renderer).
    #[arg(long, env = "IMG2SLIDES_RASTER_SCALE", default_value_t = 1.0)]
    raster_scale: f32,

    /// Images prepared in parallel (pdf renderer).
    #[arg(short, long, env = "IMG2SLIDES_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Never download pdfium; fail if no local copy is found.
    #[arg(long, env = "IMG2SLIDES_OFFLINE")]
    offline: bool,

    /// Deck title (beamer renderer).
    #[arg(long, env = "IMG2SLIDES_TITLE", default_value = "Image Comparison")]
    title: String,

    /// Deck author (beamer renderer).
    #[arg(long, env = "IMG2SLIDES_AUTHOR", default_value = "Generated automatically")]
    author: String,

    /// Beamer theme.
    #[arg(long, env = "IMG2SLIDES_THEME", default_value = "Madrid")]
    theme: String,

    /// Beamer colour theme.
    #[arg(long, env = "IMG2SLIDES_COLOR_THEME", default_value = "beaver")]
    color_theme: String,

    /// LaTeX engine executable.
    #[arg(long, env = "IMG2SLIDES_LATEX_ENGINE", default_value = "pdflatex")]
    latex_engine: String,

    /// Keep LaTeX sources and staged images in this directory.
    #[arg(long, env = "IMG2SLIDES_LATEX_WORKDIR")]
    latex_workdir: Option<PathBuf>,

    /// Write LaTeX sources only (needs --latex-workdir).
    #[arg(long, requires = "latex_workdir")]
    no_compile: bool,

    /// Print the matched pairs and exit.
    #[arg(long)]
    list_only: bool,

    /// Print a JSON summary (DeckOutput) on stdout.
    #[arg(long, env = "IMG2SLIDES_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "IMG2SLIDES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2SLIDES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMG2SLIDES_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum RendererArg {
    Pdf,
    Beamer,
}

impl From<RendererArg> for Renderer {
    fn from(v: RendererArg) -> Self {
        match v {
            RendererArg::Pdf => Renderer::Pdf,
            RendererArg::Beamer => Renderer::Beamer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Ensure pdfium is available (direct renderer only) ────────────────
    // Runs before the slide bar exists so the two bars never share stderr.
    if uses_pdfium(&cli) && !cli.offline && engine::needs_download() {
        fetch_pdfium(cli.quiet)?;
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn DeckProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_only {
        let deck = match list_pairs(&cli.folder1, &cli.folder2, &config).await {
            Err(e @ SlidesError::NoCommonImages { .. }) => {
                eprintln!("{e}");
                return Ok(());
            }
            other => other.context("Failed to scan folders")?,
        };
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&deck).context("Failed to serialise pairs")?
            );
        } else {
            println!("{}  |  {}", bold(&deck.left_label), bold(&deck.right_label));
            for (i, pair) in deck.slides.iter().enumerate() {
                println!("{:>4}. {:<40} {}", i + 1, pair.file_name, dim(&pair.title));
            }
        }
        return Ok(());
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.renderer.default_output()));

    let result = compose(&cli.folder1, &cli.folder2, &output_path, &config).await;
    if result.is_err() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_deck_complete(0, 0);
        }
    }
    let out = match result {
        Err(e @ SlidesError::NoCommonImages { .. }) => {
            eprintln!("{e}");
            return Ok(());
        }
        other => other.context("Failed to build comparison deck")?,
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        match (&out.output, &out.tex_source) {
            (Some(pdf), _) => eprintln!(
                "{}  {}/{} slides  {}ms  →  {}",
                if out.stats.skipped == 0 {
                    green("✔")
                } else {
                    yellow("⚠")
                },
                out.stats.rendered,
                out.stats.matched,
                out.stats.total_duration_ms,
                bold(&pdf.display().to_string()),
            ),
            (None, Some(tex)) => eprintln!(
                "{}  {} frames written to {}  (compile with {})",
                green("✔"),
                out.stats.rendered,
                bold(&tex.display().to_string()),
                config.beamer.latex_engine,
            ),
            (None, None) => {}
        }
        if out.stats.skipped > 0 {
            eprintln!("   {} pairs skipped", yellow(&out.stats.skipped.to_string()));
        }
    }

    Ok(())
}

/// Whether this invocation will render through pdfium.
fn uses_pdfium(cli: &Cli) -> bool {
    !cli.list_only && Renderer::from(cli.renderer) == Renderer::Pdf
}

/// Download pdfium with a byte progress bar.
fn fetch_pdfium(quiet: bool) -> Result<()> {
    if quiet {
        engine::download_library(None).context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER),
    );
    bar.set_prefix("PDF engine");
    bar.enable_steady_tick(Duration::from_millis(80));

    // The download client is blocking; keep it off the async workers.
    let result = tokio::task::block_in_place(|| {
        engine::download_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                bar.set_length(t);
            }
            bar.set_position(downloaded);
        }))
    });
    bar.finish_and_clear();
    result.context("Failed to download PDFium engine")?;
    Ok(())
}

/// Map CLI args to `DeckConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DeckConfig> {
    let mut builder = DeckConfig::builder()
        .renderer(cli.renderer.into())
        .extensions(cli.extensions.iter().map(|e| e.trim().to_string()))
        .max_image_size(cli.max_width, cli.max_height)
        .raster_scale(cli.raster_scale)
        .concurrency(cli.concurrency)
        .allow_pdfium_download(!cli.offline)
        .deck_title(&cli.title)
        .author(&cli.author)
        .theme(&cli.theme)
        .color_theme(&cli.color_theme)
        .latex_engine(&cli.latex_engine)
        .no_compile(cli.no_compile);

    if let Some(ref dir) = cli.latex_workdir {
        builder = builder.work_dir(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("img2slides").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn only_direct_renders_use_pdfium() {
        assert!(uses_pdfium(&parse(&["a", "b"])));
        assert!(!uses_pdfium(&parse(&["--list-only", "a", "b"])));
        assert!(!uses_pdfium(&parse(&["-r", "beamer", "a", "b"])));
    }

    #[test]
    fn deck_complete_clears_the_bar() {
        let cb = CliProgressCallback::new();
        cb.on_deck_start(3);
        cb.on_deck_complete(0, 0);
        assert!(cb.bar.is_finished());
    }
}
