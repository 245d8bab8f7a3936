//! Deck-building entry points.
//!
//! [`compose`] runs discovery and then hands the pairs to the configured
//! renderer. The direct renderer decodes and resamples images on the blocking
//! pool (bounded by `config.concurrency`, order preserved) before pdfium
//! assembles the document on a single thread; the Beamer renderer stages the
//! images, writes the source and drives the LaTeX engine as a child process.

use crate::config::{DeckConfig, Renderer};
use crate::engine;
use crate::error::{SkippedPair, SlidesError};
use crate::output::{Deck, DeckOutput, DeckStats, SlidePair, SlideResult};
use crate::pipeline::{self, beamer, discover, pdf, resize};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Build a comparison deck from two image folders.
///
/// # Arguments
/// * `left`, `right` — folders whose common image filenames become slides
/// * `output` — PDF to write
/// * `config` — deck configuration
///
/// # Errors
/// [`SlidesError::NoCommonImages`] when the folders share no image; any other
/// variant when the document could not be produced.
pub async fn compose(
    left: impl AsRef<Path>,
    right: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &DeckConfig,
) -> Result<DeckOutput, SlidesError> {
    let total_start = Instant::now();
    let (left, right, output) = (left.as_ref(), right.as_ref(), output.as_ref());
    info!(
        "Comparing {} with {} ({} renderer)",
        left.display(),
        right.display(),
        config.renderer
    );

    // ── Step 1: Discover pairs ───────────────────────────────────────────
    let discover_start = Instant::now();
    let deck = list_pairs(left, right, config).await?;
    let discover_duration_ms = discover_start.elapsed().as_millis() as u64;

    // ── Step 2: Render ───────────────────────────────────────────────────
    let mut out = render_deck(deck, output, config).await?;
    out.stats.discover_duration_ms = discover_duration_ms;
    out.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(out)
}

/// Render an already discovered deck, e.g. one returned by [`list_pairs`].
///
/// Pairs whose files have disappeared since discovery are skipped and
/// reported in [`DeckOutput::skipped`]; if none remain the result is
/// [`SlidesError::NoCommonImages`].
pub async fn render_deck(
    deck: Deck,
    output: impl AsRef<Path>,
    config: &DeckConfig,
) -> Result<DeckOutput, SlidesError> {
    let start = Instant::now();
    let output = output.as_ref();
    let matched = deck.slides.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_deck_start(matched);
    }

    let rendered = match config.renderer {
        Renderer::Pdf => render_pdf(&deck, output, config).await?,
        Renderer::Beamer => render_beamer(&deck, output, config).await?,
    };

    let stats = DeckStats {
        matched,
        rendered: rendered.slides.len(),
        skipped: rendered.skipped.len(),
        discover_duration_ms: 0,
        prepare_duration_ms: rendered.prepare_ms,
        emit_duration_ms: rendered.emit_ms,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Deck complete: {}/{} slides, {} skipped",
        stats.rendered, matched, stats.skipped
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_deck_complete(matched, stats.rendered);
    }

    Ok(DeckOutput {
        renderer: config.renderer,
        output: rendered.output,
        tex_source: rendered.tex_source,
        left_label: deck.left_label,
        right_label: deck.right_label,
        slides: rendered.slides,
        skipped: rendered.skipped,
        stats,
    })
}

/// Synchronous wrapper around [`compose`].
///
/// Creates a temporary tokio runtime internally.
pub fn compose_sync(
    left: impl AsRef<Path>,
    right: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &DeckConfig,
) -> Result<DeckOutput, SlidesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SlidesError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(compose(left, right, output, config))
}

/// Discover the slide pairs without rendering anything.
pub async fn list_pairs(
    left: impl AsRef<Path>,
    right: impl AsRef<Path>,
    config: &DeckConfig,
) -> Result<Deck, SlidesError> {
    let left = left.as_ref().to_path_buf();
    let right = right.as_ref().to_path_buf();
    let extensions = config.extensions.clone();

    tokio::task::spawn_blocking(move || discover::build_deck(&left, &right, &extensions))
        .await
        .map_err(|e| SlidesError::Internal(format!("Discovery task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// What a renderer hands back to [`compose`].
struct Rendered {
    output: Option<PathBuf>,
    tex_source: Option<PathBuf>,
    slides: Vec<SlideResult>,
    skipped: Vec<SkippedPair>,
    prepare_ms: u64,
    emit_ms: u64,
}

enum Prepared {
    Ready(pdf::PreparedSlide),
    Skipped(SkippedPair),
}

/// Decode and fit both images of one pair (blocking).
fn prepare_pair(pair: SlidePair, config: &DeckConfig) -> Result<Prepared, SlidesError> {
    if let Err(skip) = discover::check_pair(&pair) {
        return Ok(Prepared::Skipped(skip));
    }
    let l = &config.layout;
    let left =
        resize::prepare_image(&pair.left, l.max_image_width, l.max_image_height, l.raster_scale)?;
    let right =
        resize::prepare_image(&pair.right, l.max_image_width, l.max_image_height, l.raster_scale)?;
    Ok(Prepared::Ready(pdf::PreparedSlide { pair, left, right }))
}

async fn render_pdf(
    deck: &Deck,
    output: &Path,
    config: &DeckConfig,
) -> Result<Rendered, SlidesError> {
    let total = deck.slides.len();

    // ── Prepare images concurrently, keeping slide order ─────────────────
    let prepare_start = Instant::now();
    let mut prepared_stream = stream::iter(deck.slides.iter().cloned().map(|pair| {
        let config = config.clone();
        tokio::task::spawn_blocking(move || prepare_pair(pair, &config))
    }))
    .buffered(config.concurrency);

    let mut ready = Vec::with_capacity(total);
    let mut skipped = Vec::new();
    while let Some(joined) = prepared_stream.next().await {
        let prepared = joined
            .map_err(|e| SlidesError::Internal(format!("Prepare task panicked: {}", e)))??;
        match prepared {
            Prepared::Ready(slide) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_slide_complete(ready.len() + 1, total, &slide.pair.title);
                }
                ready.push(slide);
            }
            Prepared::Skipped(skip) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_slide_skipped(&skip.file_name, &skip.reason);
                }
                skipped.push(skip);
            }
        }
    }
    let prepare_ms = prepare_start.elapsed().as_millis() as u64;

    if ready.is_empty() {
        return Err(all_skipped(deck));
    }

    let slides = ready
        .iter()
        .enumerate()
        .map(|(i, s)| SlideResult {
            index: i + 1,
            file_name: s.pair.file_name.clone(),
            title: s.pair.title.clone(),
            left_size: Some((s.left.width_pt, s.left.height_pt)),
            right_size: Some((s.right.width_pt, s.right.height_pt)),
        })
        .collect();

    // ── Compose the document on one blocking thread ──────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_phase("writing PDF");
    }
    let emit_start = Instant::now();
    let out_path = output.to_path_buf();
    let left_label = deck.left_label.clone();
    let right_label = deck.right_label.clone();
    let layout = config.layout.clone();
    let allow_download = config.allow_pdfium_download;

    tokio::task::spawn_blocking(move || {
        let pdfium = engine::bind(allow_download, None)?;
        pdf::write_pdf(&pdfium, &ready, &left_label, &right_label, &layout, &out_path)
    })
    .await
    .map_err(|e| SlidesError::Internal(format!("PDF task panicked: {}", e)))??;

    Ok(Rendered {
        output: Some(output.to_path_buf()),
        tex_source: None,
        slides,
        skipped,
        prepare_ms,
        emit_ms: emit_start.elapsed().as_millis() as u64,
    })
}

async fn render_beamer(
    deck: &Deck,
    output: &Path,
    config: &DeckConfig,
) -> Result<Rendered, SlidesError> {
    let opts = &config.beamer;
    let work = beamer::WorkDir::create(opts.work_dir.as_deref())?;

    // ── Stage images and write the source ────────────────────────────────
    let prepare_start = Instant::now();
    let (staged, skipped, tex_path) = {
        let deck = deck.clone();
        let dir = work.path().to_path_buf();
        let opts = opts.clone();
        let progress = config.progress_callback.clone();
        tokio::task::spawn_blocking(move || {
            let (staged, skipped) = beamer::stage_images(&deck, &dir, progress.as_ref())?;
            let tex = beamer::render_tex(&deck.left_label, &deck.right_label, &staged, &opts);
            let tex_path = dir.join(beamer::TEX_FILE);
            std::fs::write(&tex_path, tex).map_err(|e| SlidesError::OutputWriteFailed {
                path: tex_path.clone(),
                source: e,
            })?;
            Ok::<_, SlidesError>((staged, skipped, tex_path))
        })
        .await
        .map_err(|e| SlidesError::Internal(format!("Staging task panicked: {}", e)))??
    };
    let prepare_ms = prepare_start.elapsed().as_millis() as u64;
    info!("Wrote {} ({} frames)", tex_path.display(), staged.len());

    if staged.is_empty() {
        return Err(all_skipped(deck));
    }

    let slides = staged
        .iter()
        .enumerate()
        .map(|(i, s)| SlideResult {
            index: i + 1,
            file_name: s.pair.file_name.clone(),
            title: s.pair.title.clone(),
            left_size: None,
            right_size: None,
        })
        .collect();
    let tex_source = work.is_kept().then(|| tex_path.clone());

    // ── Compile, unless deferred to the caller ───────────────────────────
    let emit_start = Instant::now();
    let written = if opts.no_compile {
        info!(
            "Skipping compilation; run `{} {}` in {}",
            opts.latex_engine,
            beamer::TEX_FILE,
            work.path().display()
        );
        None
    } else {
        let pdf = beamer::compile(work.path(), opts, config.progress_callback.as_ref()).await?;
        persist_output(&pdf, output).await?;
        Some(output.to_path_buf())
    };

    Ok(Rendered {
        output: written,
        tex_source,
        slides,
        skipped,
        prepare_ms,
        emit_ms: emit_start.elapsed().as_millis() as u64,
    })
}

/// Every matched pair vanished before it could be rendered.
fn all_skipped(deck: &Deck) -> SlidesError {
    warn!("Every matched pair was skipped; nothing to render");
    let folder = |p: Option<&Path>| p.map(Path::to_path_buf).unwrap_or_default();
    let first = deck.slides.first();
    SlidesError::NoCommonImages {
        left: folder(first.and_then(|s| s.left.parent())),
        right: folder(first.and_then(|s| s.right.parent())),
    }
}

/// Copy `src` to `dest` atomically: write a temp file, then rename.
async fn persist_output(src: &Path, dest: &Path) -> Result<(), SlidesError> {
    let write_err = |e| SlidesError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source: e,
    };

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    let tmp_path = pipeline::temp_path(dest);
    let copied = match tokio::fs::copy(src, &tmp_path).await {
        Ok(_) => tokio::fs::rename(&tmp_path, dest).await,
        Err(e) => Err(e),
    };
    if let Err(e) = copied {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    info!("Copied {} to {}", src.display(), dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn persist_output_replaces_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("presentation.pdf");
        let dest = dir.path().join("out/slides");
        std::fs::write(&src, b"%PDF-1.5").unwrap();

        persist_output(&src, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.5");
        assert!(!dir.path().join("out/slides.tmp").exists());
    }

    #[tokio::test]
    async fn failed_persist_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("deck.pdf");

        let err = persist_output(&dir.path().join("missing.pdf"), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, SlidesError::OutputWriteFailed { .. }));
        assert!(!dest.exists());
        assert!(!dir.path().join("deck.pdf.tmp").exists());
    }
}
