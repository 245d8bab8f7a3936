//! Folder discovery: list the images in each folder and pair them by name.
//!
//! Matching mirrors a shell glob such as `*.png`: non-recursive, case-sensitive
//! on the extension, and blind to dot-files. Pairs are sorted by filename so
//! repeated runs over the same folders always produce the same slide order.

use crate::error::{SkippedPair, SlidesError};
use crate::output::{Deck, SlidePair};
use crate::pipeline::title::{folder_label, pretty_title};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Ensure both inputs are existing directories.
pub fn validate_folders(left: &Path, right: &Path) -> Result<(), SlidesError> {
    for path in [left, right] {
        if !path.is_dir() {
            return Err(SlidesError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Names of the image files directly inside `folder`.
pub fn list_images(folder: &Path, extensions: &[String]) -> Result<BTreeSet<String>, SlidesError> {
    let read_err = |source| SlidesError::ReadDirFailed {
        path: folder.to_path_buf(),
        source,
    };

    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(folder).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let Ok(name) = entry.file_name().into_string() else {
            warn!(
                "Skipping non UTF-8 filename in {}: {:?}",
                folder.display(),
                entry.file_name()
            );
            continue;
        };
        if name.starts_with('.') || !has_image_extension(&name, extensions) {
            continue;
        }
        // Follows symlinks, like glob + open would.
        if !entry.path().is_file() {
            continue;
        }
        names.insert(name);
    }

    debug!("{}: {} image files", folder.display(), names.len());
    Ok(names)
}

fn has_image_extension(name: &str, extensions: &[String]) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => extensions.iter().any(|e| e == ext),
        _ => false,
    }
}

/// Filenames present in both sets, in sorted order.
pub fn common_files(left: &BTreeSet<String>, right: &BTreeSet<String>) -> Vec<String> {
    left.intersection(right).cloned().collect()
}

/// Discover the slide pairs for two folders.
///
/// Returns [`SlidesError::NoCommonImages`] when the folders share no image.
pub fn build_deck(left: &Path, right: &Path, extensions: &[String]) -> Result<Deck, SlidesError> {
    validate_folders(left, right)?;

    let left_files = list_images(left, extensions)?;
    let right_files = list_images(right, extensions)?;
    let common = common_files(&left_files, &right_files);

    if common.is_empty() {
        return Err(SlidesError::NoCommonImages {
            left: left.to_path_buf(),
            right: right.to_path_buf(),
        });
    }
    info!(
        "{} common images ({} left, {} right)",
        common.len(),
        left_files.len(),
        right_files.len()
    );

    let slides = common
        .into_iter()
        .map(|file_name| SlidePair {
            title: pretty_title(&file_name),
            left: left.join(&file_name),
            right: right.join(&file_name),
            file_name,
        })
        .collect();

    Ok(Deck {
        left_label: folder_label(left),
        right_label: folder_label(right),
        slides,
    })
}

/// Check that both files of a pair still exist.
///
/// Listing and rendering are separate steps, so a file can vanish in between.
pub fn check_pair(pair: &SlidePair) -> Result<(), SkippedPair> {
    let missing = match (pair.left.is_file(), pair.right.is_file()) {
        (true, true) => return Ok(()),
        (false, true) => "missing from left folder",
        (true, false) => "missing from right folder",
        (false, false) => "missing from both folders",
    };
    warn!("Cannot find {} in both folders, skipping", pair.file_name);
    Err(SkippedPair {
        file_name: pair.file_name.clone(),
        reason: missing.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EXTENSIONS;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn extension_matching_is_case_sensitive() {
        let e = exts();
        assert!(has_image_extension("a.png", &e));
        assert!(has_image_extension("a.b.jpeg", &e));
        assert!(!has_image_extension("a.PNG", &e));
        assert!(!has_image_extension("a.pdf", &e));
        assert!(!has_image_extension("png", &e));
        assert!(!has_image_extension(".png", &e));
    }

    #[test]
    fn list_skips_hidden_dirs_and_other_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "eta.png");
        touch(dir.path(), ".hidden.png");
        touch(dir.path(), "notes.txt");
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let names = list_images(dir.path(), &exts()).unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["eta.png"]);
    }

    #[test]
    fn intersection_is_sorted() {
        let a: BTreeSet<String> = ["z.png", "b.png", "a.gif"].map(String::from).into();
        let b: BTreeSet<String> = ["b.png", "z.png", "c.png"].map(String::from).into();
        assert_eq!(common_files(&a, &b), vec!["b.png", "z.png"]);
    }

    #[test]
    fn build_deck_pairs_common_files() {
        let root = TempDir::new().unwrap();
        let left = root.path().join("runs/a");
        let right = root.path().join("runs/b");
        fs::create_dir_all(&left).unwrap();
        fs::create_dir_all(&right).unwrap();
        touch(&left, "jet_pt.png");
        touch(&left, "only_left.png");
        touch(&right, "jet_pt.png");
        touch(&right, "only_right.jpg");

        let deck = build_deck(&left, &right, &exts()).unwrap();
        assert_eq!(deck.left_label, "runs/a");
        assert_eq!(deck.right_label, "runs/b");
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].title, "Jet Pt");
        assert_eq!(deck.slides[0].left, left.join("jet_pt.png"));
    }

    #[test]
    fn build_deck_without_overlap_fails() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        touch(a.path(), "x.png");
        touch(b.path(), "y.png");
        let err = build_deck(a.path(), b.path(), &exts()).unwrap_err();
        assert!(matches!(err, SlidesError::NoCommonImages { .. }));
    }

    #[test]
    fn missing_folder_is_rejected() {
        let a = TempDir::new().unwrap();
        let missing = a.path().join("nope");
        let err = build_deck(a.path(), &missing, &exts()).unwrap_err();
        match err {
            SlidesError::NotADirectory { path } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn check_pair_reports_vanished_side() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "l.png");
        let pair = SlidePair {
            file_name: "l.png".into(),
            title: "L".into(),
            left: dir.path().join("l.png"),
            right: dir.path().join("gone.png"),
        };
        let skipped = check_pair(&pair).unwrap_err();
        assert_eq!(skipped.reason, "missing from right folder");
    }
}
