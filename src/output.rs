//! Result types returned by the deck-building entry points.

use crate::config::Renderer;
use crate::error::SkippedPair;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One matched filename, ready to become a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePair {
    /// Bare filename shared by both folders, e.g. `jet_pt.png`.
    pub file_name: String,
    /// Derived slide title, e.g. `Jet Pt`.
    pub title: String,
    pub left: PathBuf,
    pub right: PathBuf,
}

/// Everything discovery found: the two column labels and the sorted pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub left_label: String,
    pub right_label: String,
    pub slides: Vec<SlidePair>,
}

/// Per-slide record in the final output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideResult {
    /// 1-based slide number in the emitted document.
    pub index: usize,
    pub file_name: String,
    pub title: String,
    /// Fitted size of the left image in points (direct renderer only).
    pub left_size: Option<(u32, u32)>,
    /// Fitted size of the right image in points (direct renderer only).
    pub right_size: Option<(u32, u32)>,
}

/// Timing and count summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckStats {
    /// Filenames common to both folders.
    pub matched: usize,
    pub rendered: usize,
    pub skipped: usize,
    pub discover_duration_ms: u64,
    pub prepare_duration_ms: u64,
    pub emit_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Complete result of [`crate::compose`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckOutput {
    pub renderer: Renderer,
    /// PDF written, or `None` when LaTeX compilation was deferred.
    pub output: Option<PathBuf>,
    /// LaTeX source kept on disk, if any.
    pub tex_source: Option<PathBuf>,
    pub left_label: String,
    pub right_label: String,
    pub slides: Vec<SlideResult>,
    pub skipped: Vec<SkippedPair>,
    pub stats: DeckStats,
}
