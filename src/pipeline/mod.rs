//! Pipeline stages for comparison-deck generation.
//!
//! ## Data Flow
//!
//! ```text
//!                         ┌─▶ resize ──▶ layout ──▶ pdf      (direct)
//! discover ──▶ title ─────┤
//!  (folders)  (labels)    └─▶ beamer: stage ──▶ tex ──▶ pdflatex
//! ```
//!
//! 1. [`discover`] — validate the two folders, list images, intersect names
//! 2. [`title`]    — slide titles from filenames, captions from folder paths
//! 3. [`resize`]   — aspect-preserving fit plus Lanczos resampling
//! 4. [`layout`]   — pure table geometry for the direct renderer
//! 5. [`pdf`]      — draw slides with pdfium; runs on one blocking thread
//! 6. [`beamer`]   — stage images, emit Beamer source, run the LaTeX engine

pub mod beamer;
pub mod discover;
pub mod layout;
pub mod pdf;
pub mod resize;
pub mod title;

use std::path::{Path, PathBuf};

/// Sibling path a document is written to before being renamed into place:
/// `<output>.tmp`, whatever the output's extension.
pub fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_to_full_name() {
        assert_eq!(temp_path(Path::new("out/deck.pdf")), Path::new("out/deck.pdf.tmp"));
        assert_eq!(temp_path(Path::new("slides")), Path::new("slides.tmp"));
        assert_eq!(temp_path(Path::new("deck.tar")), Path::new("deck.tar.tmp"));
    }
}
