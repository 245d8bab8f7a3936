//! # img2slides
//!
//! Build side-by-side comparison slide decks from two folders of images.
//!
//! Every image filename present in both folders becomes one slide: a title
//! derived from the filename, and the two versions next to each other under
//! captions naming their folders. Typical use is comparing plot outputs of two
//! analysis runs.
//!
//! ## Pipeline Overview
//!
//! ```text
//! folder A, folder B
//!  │
//!  ├─ 1. Discover  list *.png/*.jpg/*.jpeg/*.gif, intersect names (sorted)
//!  ├─ 2. Label     slide titles from filenames, captions from folder paths
//!  └─ 3. Emit      one of two renderers:
//!        ├─ pdf     fit images, draw a two-column table per page via pdfium
//!        └─ beamer  stage images, write Beamer source, run pdflatex twice
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img2slides::{compose, DeckConfig, Renderer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DeckConfig::builder().renderer(Renderer::Pdf).build()?;
//!     let out = compose("runs/v1/plots", "runs/v2/plots", "comparison.pdf", &config).await?;
//!     eprintln!("{} slides, {} skipped", out.stats.rendered, out.stats.skipped);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2slides` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compose::{compose, compose_sync, list_pairs, render_deck};
pub use config::{BeamerOptions, DeckConfig, DeckConfigBuilder, LayoutConfig, Renderer};
pub use error::{SkippedPair, SlidesError};
pub use output::{Deck, DeckOutput, DeckStats, SlidePair, SlideResult};
pub use progress::{DeckProgressCallback, NoopProgressCallback, ProgressCallback};
