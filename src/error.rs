//! Error types for the img2slides library.
//!
//! Two distinct types reflect two distinct outcomes:
//!
//! * [`SlidesError`] — **Fatal**: the deck cannot be produced at all (missing
//!   folder, undecodable image, LaTeX failure, pdfium unavailable). Returned as
//!   `Err(SlidesError)` from the top-level `compose*` functions.
//!
//! * [`SkippedPair`] — **Non-fatal**: one filename was matched during
//!   discovery but one side disappeared before it could be used. The pair is
//!   left out of the deck and recorded in [`crate::output::DeckOutput`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the img2slides library.
#[derive(Debug, Error)]
pub enum SlidesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// One of the two input paths is not an existing directory.
    #[error("'{path}' is not an existing directory\nBoth inputs must be folders of images.")]
    NotADirectory { path: PathBuf },

    /// A folder exists but could not be listed.
    #[error("Failed to list folder '{path}': {source}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The two folders share no image filename.
    #[error("No common image files found between '{left}' and '{right}'")]
    NoCommonImages { left: PathBuf, right: PathBuf },

    /// An image file exists but could not be decoded.
    #[error("Failed to decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    // ── Direct PDF errors ─────────────────────────────────────────────────
    /// pdfium-render returned an error while composing a slide.
    #[error("Failed to compose slide {slide} ('{file_name}'): {detail}")]
    SlideComposeFailed {
        slide: usize,
        file_name: String,
        detail: String,
    },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Use --renderer beamer if a TeX installation is available.\n"
    )]
    PdfiumBindingFailed(String),

    // ── LaTeX errors ──────────────────────────────────────────────────────
    /// The LaTeX engine binary could not be started.
    #[error("LaTeX engine '{program}' could not be started: {reason}\nInstall TeX Live / MiKTeX or pass --latex-engine.")]
    LatexNotFound { program: String, reason: String },

    /// A LaTeX pass exited unsuccessfully.
    #[error("LaTeX compilation failed on pass {pass} ({status})\n--- {program} output (tail) ---\n{log}")]
    LatexFailed {
        program: String,
        pass: u8,
        status: String,
        log: String,
    },

    /// The LaTeX engine exited cleanly but produced no PDF.
    #[error("LaTeX finished but '{path}' was not produced")]
    LatexNoOutput { path: PathBuf },

    /// Could not stage an image into the LaTeX work directory.
    #[error("Failed to stage '{path}' for LaTeX: {detail}")]
    StagingFailed { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A matched filename that was left out of the deck.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("Skipped '{file_name}': {reason}")]
pub struct SkippedPair {
    pub file_name: String,
    pub reason: String,
}
