//! Locating and binding the pdfium shared library used by the direct renderer.
//!
//! Resolution order, first hit wins:
//!
//! 1. `PDFIUM_LIB_PATH` pointing at an existing library file.
//! 2. The per-user cache, `<cache>/img2slides/pdfium-<version>/`
//!    (`IMG2SLIDES_PDFIUM_CACHE` replaces `<cache>`).
//! 3. The platform's system library search path.
//! 4. A download of the matching archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries)
//!    into the cache, when downloads are allowed.
//!
//! The Beamer renderer never touches this module.

use crate::error::SlidesError;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// pdfium-binaries release used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

const RELEASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Byte-progress observer for the download: `(downloaded, total)`.
pub type DownloadProgress<'a> = &'a dyn Fn(u64, Option<u64>);

/// Where a bound library came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// Explicit path from `PDFIUM_LIB_PATH`.
    EnvOverride(PathBuf),
    /// Previously downloaded copy in the cache.
    Cached(PathBuf),
    /// Whatever the dynamic loader finds.
    System,
}

/// Archive name and in-archive path of the library for this platform.
fn platform_archive() -> Result<(&'static str, &'static str), SlidesError> {
    let archive = match (std::env::consts::OS, std::env::consts::ARCH) {
        ("linux", "x86_64") => ("pdfium-linux-x64.tgz", "lib/libpdfium.so"),
        ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", "lib/libpdfium.so"),
        ("macos", "x86_64") => ("pdfium-mac-x64.tgz", "lib/libpdfium.dylib"),
        ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", "lib/libpdfium.dylib"),
        ("windows", "x86_64") => ("pdfium-win-x64.tgz", "bin/pdfium.dll"),
        ("windows", "aarch64") => ("pdfium-win-arm64.tgz", "bin/pdfium.dll"),
        ("windows", "x86") => ("pdfium-win-x86.tgz", "bin/pdfium.dll"),
        (os, arch) => {
            return Err(SlidesError::PdfiumBindingFailed(format!(
                "no prebuilt pdfium for {os}/{arch}"
            )))
        }
    };
    Ok(archive)
}

/// Per-version directory holding the downloaded library.
pub fn cache_dir() -> PathBuf {
    let base = std::env::var_os("IMG2SLIDES_PDFIUM_CACHE")
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|d| d.join("img2slides")))
        .unwrap_or_else(|| std::env::temp_dir().join("img2slides"));
    base.join(format!("pdfium-{PDFIUM_VERSION}"))
}

/// Path the cached library would have on this platform.
pub fn cached_library_path() -> PathBuf {
    Pdfium::pdfium_platform_library_name_at_path(&cache_dir())
}

/// Find a library without touching the network.
pub fn locate_library() -> Option<LibrarySource> {
    if let Some(p) = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from) {
        if p.is_file() {
            return Some(LibrarySource::EnvOverride(p));
        }
        debug!("PDFIUM_LIB_PATH {} does not exist, ignoring", p.display());
    }
    let cached = cached_library_path();
    if cached.is_file() {
        return Some(LibrarySource::Cached(cached));
    }
    None
}

/// Whether binding will need a download (no env override, no cached copy,
/// and no system library).
pub fn needs_download() -> bool {
    locate_library().is_none() && Pdfium::bind_to_system_library().is_err()
}

/// Bind pdfium following the resolution order above.
pub fn bind(
    allow_download: bool,
    on_progress: Option<DownloadProgress<'_>>,
) -> Result<Pdfium, SlidesError> {
    if let Some(source) = locate_library() {
        return bind_source(&source);
    }
    if let Ok(pdfium) = bind_source(&LibrarySource::System) {
        return Ok(pdfium);
    }
    if !allow_download {
        return Err(SlidesError::PdfiumBindingFailed(
            "no local pdfium found and downloads are disabled".into(),
        ));
    }
    let path = download_library(on_progress)?;
    bind_source(&LibrarySource::Cached(path))
}

fn bind_source(source: &LibrarySource) -> Result<Pdfium, SlidesError> {
    let bindings = match source {
        LibrarySource::EnvOverride(path) | LibrarySource::Cached(path) => {
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(path)
        }
        LibrarySource::System => {
            debug!("Binding system pdfium");
            Pdfium::bind_to_system_library()
        }
    }
    .map_err(|e| SlidesError::PdfiumBindingFailed(format!("{source:?}: {e}")))?;
    Ok(Pdfium::new(bindings))
}

/// Download the platform archive and unpack the library into the cache.
pub fn download_library(on_progress: Option<DownloadProgress<'_>>) -> Result<PathBuf, SlidesError> {
    let (archive, member) = platform_archive()?;
    let url = format!("{RELEASE_URL}/chromium%2F{PDFIUM_VERSION}/{archive}");
    let dest = cached_library_path();
    info!("Downloading pdfium from {url}");

    let fail = |what: &str, e: &dyn std::fmt::Display| {
        SlidesError::PdfiumBindingFailed(format!("{what}: {e}"))
    };

    let mut response = reqwest::blocking::Client::builder()
        .user_agent(concat!("img2slides/", env!("CARGO_PKG_VERSION")))
        .build()
        .and_then(|c| c.get(&url).send())
        .and_then(|r| r.error_for_status())
        .map_err(|e| fail("download failed", &e))?;

    let total = response.content_length();
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = [0u8; 64 * 1024];
    loop {
        let n = match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(fail("download interrupted", &e)),
        };
        bytes.extend_from_slice(&chunk[..n]);
        if let Some(cb) = on_progress {
            cb(bytes.len() as u64, total);
        }
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| fail("cannot create cache dir", &e))?;
    }
    unpack_member(&bytes, member, &dest)?;
    info!("pdfium cached at {}", dest.display());
    Ok(dest)
}

/// Extract `member` from a gzipped tarball to `dest`.
fn unpack_member(tgz: &[u8], member: &str, dest: &Path) -> Result<(), SlidesError> {
    let extract_err = |e: std::io::Error| SlidesError::PdfiumBindingFailed(format!("extract: {e}"));
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(tgz));

    for entry in archive.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;
        if entry.path().map_err(extract_err)?.as_ref() == Path::new(member) {
            entry.unpack(dest).map_err(extract_err)?;
            return Ok(());
        }
    }
    Err(SlidesError::PdfiumBindingFailed(format!(
        "'{member}' not found in downloaded archive"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn tgz_with(member: &str, data: &[u8]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, member, data).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn current_platform_has_archive() {
        let (archive, member) = platform_archive().unwrap();
        assert!(archive.ends_with(".tgz"));
        assert!(member.contains("pdfium"));
    }

    #[test]
    fn cache_dir_is_versioned() {
        let d = cache_dir();
        assert!(d.to_string_lossy().contains(PDFIUM_VERSION));
        assert_eq!(d, cache_dir());
    }

    #[test]
    fn unpack_extracts_named_member() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("libpdfium.so");
        let tgz = tgz_with("lib/libpdfium.so", b"ELF");
        unpack_member(&tgz, "lib/libpdfium.so", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"ELF");
    }

    #[test]
    fn unpack_reports_missing_member() {
        let dir = TempDir::new().unwrap();
        let tgz = tgz_with("lib/other.so", b"x");
        let err = unpack_member(&tgz, "lib/libpdfium.so", &dir.path().join("o")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
