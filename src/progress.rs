//! Progress-callback trait for per-slide events.
//!
//! Inject an [`Arc<dyn DeckProgressCallback>`] via
//! [`crate::config::DeckConfigBuilder::progress_callback`] to receive events
//! as the pipeline prepares each slide and assembles the document.
//!
//! # Example
//!
//! ```rust
//! use img2slides::{DeckConfig, DeckProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl DeckProgressCallback for Counter {
//!     fn on_slide_complete(&self, index: usize, total: usize, title: &str) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total} {title}");
//!     }
//! }
//!
//! let config = DeckConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline while a deck is produced.
///
/// Implementations must be `Send + Sync`: slide preparation for the direct
/// renderer runs on several blocking threads. All methods default to no-ops.
pub trait DeckProgressCallback: Send + Sync {
    /// Called once after discovery, before any slide is prepared.
    fn on_deck_start(&self, total_slides: usize) {
        let _ = total_slides;
    }

    /// Called when a slide's images are ready (resampled or staged).
    ///
    /// `index` is 1-based; completions arrive in slide order.
    fn on_slide_complete(&self, index: usize, total_slides: usize, title: &str) {
        let _ = (index, total_slides, title);
    }

    /// Called when a matched pair is left out of the deck.
    fn on_slide_skipped(&self, file_name: &str, reason: &str) {
        let _ = (file_name, reason);
    }

    /// Called when a document-level phase begins (e.g. "writing PDF",
    /// "pdflatex pass 1/2").
    fn on_phase(&self, phase: &str) {
        let _ = phase;
    }

    /// Called once after the output file has been written.
    fn on_deck_complete(&self, total_slides: usize, rendered: usize) {
        let _ = (total_slides, rendered);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DeckProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DeckConfig`].
pub type ProgressCallback = Arc<dyn DeckProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        completes: AtomicUsize,
        skipped: AtomicUsize,
        phases: Mutex<Vec<String>>,
    }

    impl DeckProgressCallback for Recorder {
        fn on_slide_complete(&self, _index: usize, _total: usize, _title: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_slide_skipped(&self, _file_name: &str, _reason: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_phase(&self, phase: &str) {
            self.phases.lock().unwrap().push(phase.to_string());
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_deck_start(2);
        cb.on_slide_complete(1, 2, "Eta");
        cb.on_slide_skipped("pt.png", "gone");
        cb.on_phase("writing PDF");
        cb.on_deck_complete(2, 1);
    }

    #[test]
    fn recorder_receives_events_through_arc() {
        let rec = Arc::new(Recorder::default());
        let cb: ProgressCallback = rec.clone();
        cb.on_slide_complete(1, 2, "Eta");
        cb.on_slide_complete(2, 2, "Phi");
        cb.on_slide_skipped("pt.png", "gone");
        cb.on_phase("pdflatex pass 1/2");

        assert_eq!(rec.completes.load(Ordering::SeqCst), 2);
        assert_eq!(rec.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(*rec.phases.lock().unwrap(), vec!["pdflatex pass 1/2"]);
    }
}
