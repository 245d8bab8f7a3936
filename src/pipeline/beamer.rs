//! LaTeX/Beamer renderer: stage images, emit `presentation.tex`, and run the
//! LaTeX engine over it.
//!
//! Images are copied under neutral names (`folder1_0001.png`, …) so that
//! spaces, dots or TeX-active characters in the original filenames never reach
//! `\includegraphics`. PNG and JPEG content is copied as is, under the
//! extension matching what the bytes actually are; anything else (GIF) is
//! re-encoded to PNG, since pdflatex cannot include it.

use crate::config::BeamerOptions;
use crate::error::{SkippedPair, SlidesError};
use crate::output::{Deck, SlidePair};
use crate::pipeline::discover::check_pair;
use crate::pipeline::resize::open_image;
use crate::progress::ProgressCallback;
use image::{ImageFormat, ImageReader};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tracing::{debug, info};

/// Name of the generated source file inside the work directory.
pub const TEX_FILE: &str = "presentation.tex";
/// Name of the PDF the engine produces next to [`TEX_FILE`].
pub const PDF_FILE: &str = "presentation.pdf";

/// Lines of engine output kept in [`SlidesError::LatexFailed`].
const LOG_TAIL_LINES: usize = 40;

/// Directory holding the LaTeX sources and staged images.
pub enum WorkDir {
    /// Caller-chosen directory; left in place afterwards.
    Kept(PathBuf),
    /// Temporary directory removed on drop.
    Temp(TempDir),
}

impl WorkDir {
    pub fn create(requested: Option<&Path>) -> Result<Self, SlidesError> {
        match requested {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| SlidesError::OutputWriteFailed {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
                Ok(WorkDir::Kept(dir.to_path_buf()))
            }
            None => TempDir::new()
                .map(WorkDir::Temp)
                .map_err(|e| SlidesError::Internal(format!("tempdir: {e}"))),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            WorkDir::Kept(p) => p,
            WorkDir::Temp(t) => t.path(),
        }
    }

    pub fn is_kept(&self) -> bool {
        matches!(self, WorkDir::Kept(_))
    }
}

/// A pair whose images now live in the work directory.
#[derive(Debug, Clone)]
pub struct StagedPair {
    pub pair: SlidePair,
    pub left_name: String,
    pub right_name: String,
}

/// Copy (or convert) every pair into `dir`. Pairs with a vanished side are
/// returned as skipped; an unreadable image is fatal.
pub fn stage_images(
    deck: &Deck,
    dir: &Path,
    progress: Option<&ProgressCallback>,
) -> Result<(Vec<StagedPair>, Vec<SkippedPair>), SlidesError> {
    let total = deck.slides.len();
    let mut staged = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for pair in &deck.slides {
        if let Err(skip) = check_pair(pair) {
            if let Some(cb) = progress {
                cb.on_slide_skipped(&skip.file_name, &skip.reason);
            }
            skipped.push(skip);
            continue;
        }
        let n = staged.len() + 1;
        let left_name = stage_one(&pair.left, dir, &format!("folder1_{n:04}"))?;
        let right_name = stage_one(&pair.right, dir, &format!("folder2_{n:04}"))?;
        if let Some(cb) = progress {
            cb.on_slide_complete(n, total, &pair.title);
        }
        staged.push(StagedPair {
            pair: pair.clone(),
            left_name,
            right_name,
        });
    }

    Ok((staged, skipped))
}

fn stage_one(src: &Path, dir: &Path, stem: &str) -> Result<String, SlidesError> {
    let stage_err = |detail: String| SlidesError::StagingFailed {
        path: src.to_path_buf(),
        detail,
    };
    let reader = ImageReader::open(src)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| stage_err(e.to_string()))?;

    let copied_ext = match reader.format() {
        Some(ImageFormat::Png) => Some("png"),
        Some(ImageFormat::Jpeg) => Some("jpg"),
        _ => None,
    };
    let name = match copied_ext {
        Some(ext) => {
            let name = format!("{stem}.{ext}");
            std::fs::copy(src, dir.join(&name)).map_err(|e| stage_err(e.to_string()))?;
            name
        }
        None => {
            let name = format!("{stem}.png");
            open_image(src)?
                .save_with_format(dir.join(&name), ImageFormat::Png)
                .map_err(|e| stage_err(e.to_string()))?;
            name
        }
    };
    debug!("Staged {} as {}", src.display(), name);
    Ok(name)
}

/// Escape text for use in LaTeX body text and arguments.
pub fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Generate the Beamer source for the staged pairs.
pub fn render_tex(
    left_label: &str,
    right_label: &str,
    slides: &[StagedPair],
    opts: &BeamerOptions,
) -> String {
    let left = escape_latex(left_label);
    let right = escape_latex(right_label);
    let mut tex = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(tex, r"\documentclass[aspectratio={}]{{beamer}}", opts.aspect_ratio);
    tex.push_str(
        r"\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{graphicx}
\usepackage{caption}
\usepackage{subcaption}
",
    );
    let _ = writeln!(tex, r"\usetheme{{{}}}", opts.theme);
    let _ = writeln!(tex, r"\usecolortheme{{{}}}", opts.color_theme);
    tex.push_str(
        r"\setbeamertemplate{navigation symbols}{}
\setbeamertemplate{footline}[frame number]
",
    );
    let _ = writeln!(tex, r"\title{{{}}}", escape_latex(&opts.title));
    let _ = writeln!(tex, r"\subtitle{{{left} vs {right}}}");
    let _ = writeln!(tex, r"\author{{{}}}", escape_latex(&opts.author));
    tex.push_str("\\date{\\today}\n\\begin{document}\n");

    for s in slides {
        let _ = writeln!(tex, r"\begin{{frame}}");
        let _ = writeln!(tex, r"\frametitle{{{}}}", escape_latex(&s.pair.title));
        tex.push_str("\\begin{figure}[ht]\n\\centering\n");
        for (i, (file, caption)) in [(&s.left_name, &left), (&s.right_name, &right)]
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                tex.push_str("\\hfill\n");
            }
            tex.push_str("\\begin{subfigure}{0.48\\textwidth}\n\\centering\n");
            let _ = writeln!(tex, r"\includegraphics[width=\textwidth]{{{file}}}");
            let _ = writeln!(tex, r"\caption{{{caption}}}");
            tex.push_str("\\end{subfigure}\n");
        }
        tex.push_str("\\end{figure}\n\\end{frame}\n");
    }

    tex.push_str("\\end{document}\n");
    tex
}

/// Run the LaTeX engine `opts.passes` times in `dir` and return the PDF path.
pub async fn compile(
    dir: &Path,
    opts: &BeamerOptions,
    progress: Option<&ProgressCallback>,
) -> Result<PathBuf, SlidesError> {
    let program = opts.latex_engine.as_str();

    for pass in 1..=opts.passes {
        let phase = format!("{program} pass {pass}/{}", opts.passes);
        info!("Running {phase}");
        if let Some(cb) = progress {
            cb.on_phase(&phase);
        }

        let out = tokio::process::Command::new(program)
            .arg("-interaction=nonstopmode")
            .arg(TEX_FILE)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SlidesError::LatexNotFound {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        if !out.status.success() {
            let mut log = log_tail(&String::from_utf8_lossy(&out.stdout), LOG_TAIL_LINES);
            let stderr = String::from_utf8_lossy(&out.stderr);
            if !stderr.trim().is_empty() {
                log.push('\n');
                log.push_str(stderr.trim_end());
            }
            return Err(SlidesError::LatexFailed {
                program: program.to_string(),
                pass,
                status: out.status.to_string(),
                log,
            });
        }
    }

    let pdf = dir.join(PDF_FILE);
    if !pdf.is_file() {
        return Err(SlidesError::LatexNoOutput { path: pdf });
    }
    Ok(pdf)
}

/// Last `n` lines of `text`.
fn log_tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
