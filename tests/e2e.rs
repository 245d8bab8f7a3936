//! End-to-end tests for img2slides.
//!
//! Fixture folders are generated on the fly with the `image` crate. Tests
//! that need the pdfium library or a TeX installation are gated behind the
//! `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested.
//!
//! Run everything with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use image::{Rgb, RgbImage};
use img2slides::{
    compose, list_pairs, render_deck, DeckConfig, DeckProgressCallback, Renderer, SlidesError,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

struct Fixture {
    _root: TempDir,
    left: PathBuf,
    right: PathBuf,
    out_dir: PathBuf,
}

fn write_image(dir: &Path, name: &str, w: u32, h: u32, shade: u8) {
    RgbImage::from_pixel(w, h, Rgb([shade, 255 - shade, 128]))
        .save(dir.join(name))
        .unwrap();
}

/// Two run folders sharing `eta.png`, `jet_pt.jpg` and `mass-hist.gif`,
/// plus one file unique to each side and a non-image.
fn fixture() -> Fixture {
    let root = TempDir::new().unwrap();
    let left = root.path().join("runs/v1");
    let right = root.path().join("runs/v2");
    let out_dir = root.path().join("out");
    for d in [&left, &right, &out_dir] {
        std::fs::create_dir_all(d).unwrap();
    }

    for (dir, shade) in [(&left, 40u8), (&right, 200u8)] {
        write_image(dir, "eta.png", 640, 480, shade);
        write_image(dir, "jet_pt.jpg", 300, 900, shade);
        write_image(dir, "mass-hist.gif", 50, 20, shade);
    }
    write_image(&left, "only_v1.png", 10, 10, 0);
    write_image(&right, "only_v2.png", 10, 10, 0);
    std::fs::write(right.join("README.txt"), "not an image").unwrap();

    Fixture {
        _root: root,
        left,
        right,
        out_dir,
    }
}

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

#[derive(Default)]
struct Counting {
    started: AtomicUsize,
    completed: AtomicUsize,
    skipped: AtomicUsize,
    finished: AtomicUsize,
}

impl DeckProgressCallback for Counting {
    fn on_deck_start(&self, total_slides: usize) {
        self.started.store(total_slides, Ordering::SeqCst);
    }

    fn on_slide_complete(&self, _index: usize, _total: usize, _title: &str) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_slide_skipped(&self, _file_name: &str, _reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn on_deck_complete(&self, _total: usize, rendered: usize) {
        self.finished.store(rendered, Ordering::SeqCst);
    }
}

// ── Discovery (no external tools) ────────────────────────────────────────────

#[tokio::test]
async fn list_pairs_matches_sorted_common_images() {
    let fx = fixture();
    let deck = list_pairs(&fx.left, &fx.right, &DeckConfig::default())
        .await
        .expect("discovery should succeed");

    assert_eq!(deck.left_label, "runs/v1");
    assert_eq!(deck.right_label, "runs/v2");
    let names: Vec<_> = deck.slides.iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(names, vec!["eta.png", "jet_pt.jpg", "mass-hist.gif"]);
    let titles: Vec<_> = deck.slides.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Eta", "Jet Pt", "Mass Hist"]);
}

#[tokio::test]
async fn list_pairs_honours_extension_filter() {
    let fx = fixture();
    let config = DeckConfig::builder().extensions(["jpg"]).build().unwrap();
    let deck = list_pairs(&fx.left, &fx.right, &config).await.unwrap();
    assert_eq!(deck.slides.len(), 1);
    assert_eq!(deck.slides[0].file_name, "jet_pt.jpg");
}

#[tokio::test]
async fn compose_without_common_images_writes_nothing() {
    let fx = fixture();
    let empty = fx.out_dir.join("empty");
    std::fs::create_dir_all(&empty).unwrap();
    let output = fx.out_dir.join("never.pdf");

    let err = compose(&fx.left, &empty, &output, &DeckConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SlidesError::NoCommonImages { .. }), "got: {err}");
    assert!(!output.exists());
}

#[tokio::test]
async fn compose_rejects_file_as_folder() {
    let fx = fixture();
    let file = fx.left.join("eta.png");
    let err = compose(&file, &fx.right, fx.out_dir.join("x.pdf"), &DeckConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SlidesError::NotADirectory { .. }), "got: {err}");
}

// ── Beamer sources (no TeX needed) ───────────────────────────────────────────

#[tokio::test]
async fn beamer_no_compile_keeps_sources_and_staged_images() {
    let fx = fixture();
    let work = fx.out_dir.join("latex");
    let counter = Arc::new(Counting::default());
    let config = DeckConfig::builder()
        .renderer(Renderer::Beamer)
        .work_dir(&work)
        .no_compile(true)
        .deck_title("v1 & v2")
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    let out = compose(&fx.left, &fx.right, fx.out_dir.join("deck.pdf"), &config)
        .await
        .expect("staging should succeed");

    assert!(out.output.is_none());
    assert_eq!(out.tex_source.as_deref(), Some(work.join("presentation.tex").as_path()));
    assert_eq!(out.stats.rendered, 3);
    assert_eq!(out.stats.matched, 3);

    let tex = std::fs::read_to_string(work.join("presentation.tex")).unwrap();
    assert_eq!(tex.matches("\\begin{frame}").count(), 3);
    assert!(tex.contains("\\title{v1 \\& v2}"));
    assert!(tex.contains("\\frametitle{Mass Hist}"));
    assert!(tex.contains("\\subtitle{runs/v1 vs runs/v2}"));

    assert!(work.join("folder1_0001.png").is_file());
    assert!(work.join("folder2_0002.jpg").is_file());
    // GIF input is re-encoded for pdflatex.
    assert!(work.join("folder1_0003.png").is_file());

    assert_eq!(counter.started.load(Ordering::SeqCst), 3);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 3);
    assert_eq!(counter.finished.load(Ordering::SeqCst), 3);
}

fn staging_config(work: &Path, counter: &Arc<Counting>) -> DeckConfig {
    DeckConfig::builder()
        .renderer(Renderer::Beamer)
        .work_dir(work)
        .no_compile(true)
        .progress_callback(counter.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn files_vanishing_after_discovery_are_skipped_and_counted() {
    let fx = fixture();
    let mut deck = list_pairs(&fx.left, &fx.right, &DeckConfig::default())
        .await
        .unwrap();
    std::fs::remove_file(fx.right.join("jet_pt.jpg")).unwrap();
    deck.slides[0].left = fx.left.join("renamed_eta.png");

    let counter = Arc::new(Counting::default());
    let work = fx.out_dir.join("partial");
    let out = render_deck(deck, fx.out_dir.join("deck.pdf"), &staging_config(&work, &counter))
        .await
        .expect("remaining pair should still stage");

    assert_eq!(out.stats.matched, 3);
    assert_eq!(out.stats.rendered, 1);
    assert_eq!(out.stats.skipped, 2);
    assert_eq!(out.slides[0].file_name, "mass-hist.gif");
    assert_eq!(out.slides[0].index, 1);

    let skipped: Vec<_> = out
        .skipped
        .iter()
        .map(|s| (s.file_name.as_str(), s.reason.as_str()))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("eta.png", "missing from left folder"),
            ("jet_pt.jpg", "missing from right folder"),
        ]
    );
    assert_eq!(counter.skipped.load(Ordering::SeqCst), 2);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
    assert_eq!(counter.finished.load(Ordering::SeqCst), 1);

    let tex = std::fs::read_to_string(work.join("presentation.tex")).unwrap();
    assert_eq!(tex.matches("\\begin{frame}").count(), 1);
}

#[tokio::test]
async fn every_pair_vanishing_is_no_common_images() {
    let fx = fixture();
    let deck = list_pairs(&fx.left, &fx.right, &DeckConfig::default())
        .await
        .unwrap();
    std::fs::remove_dir_all(&fx.right).unwrap();

    let counter = Arc::new(Counting::default());
    let output = fx.out_dir.join("deck.pdf");
    let err = render_deck(deck, &output, &staging_config(&fx.out_dir.join("none"), &counter))
        .await
        .unwrap_err();

    assert!(matches!(err, SlidesError::NoCommonImages { .. }), "got: {err}");
    assert_eq!(counter.skipped.load(Ordering::SeqCst), 3);
    assert!(!output.exists());
}

// ── Full renders (external dependencies) ─────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn direct_pdf_has_one_page_per_pair() {
    e2e_skip_unless_enabled!();
    let fx = fixture();
    let output = fx.out_dir.join("direct.pdf");

    let out = compose(&fx.left, &fx.right, &output, &DeckConfig::default())
        .await
        .expect("direct render should succeed");

    assert_eq!(out.stats.rendered, 3);
    assert_eq!(out.slides[0].left_size, Some((373, 280)));
    assert_eq!(out.slides[1].left_size, Some((93, 280)));
    assert_eq!(out.slides[2].left_size, Some((380, 152)));

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(!fx.out_dir.join("direct.pdf.tmp").exists());

    let pdfium = img2slides::engine::bind(false, None).unwrap();
    let doc = pdfium.load_pdf_from_file(&output, None).unwrap();
    assert_eq!(doc.pages().len(), 3);
}

#[tokio::test]
async fn beamer_compiles_with_pdflatex() {
    e2e_skip_unless_enabled!();
    let fx = fixture();
    let output = fx.out_dir.join("beamer.pdf");
    let config = DeckConfig::builder()
        .renderer(Renderer::Beamer)
        .build()
        .unwrap();

    let out = compose(&fx.left, &fx.right, &output, &config)
        .await
        .expect("beamer render should succeed");

    assert_eq!(out.output.as_deref(), Some(output.as_path()));
    assert!(out.tex_source.is_none());
    assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF"));
}
