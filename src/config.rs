//! Configuration types for comparison-deck generation.
//!
//! All behaviour is controlled through [`DeckConfig`], built via its
//! [`DeckConfigBuilder`]. The geometry of the direct PDF renderer lives in
//! [`LayoutConfig`] and the LaTeX-specific knobs in [`BeamerOptions`], so each
//! renderer only reads the part it owns.

use crate::error::SlidesError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Image extensions matched by default. Case-sensitive, like `*.png` globs.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Configuration for a comparison deck.
///
/// Built via [`DeckConfig::builder()`] or using [`DeckConfig::default()`].
///
/// # Example
/// ```rust
/// use img2slides::{DeckConfig, Renderer};
///
/// let config = DeckConfig::builder()
///     .renderer(Renderer::Beamer)
///     .deck_title("Run 12 vs Run 13")
///     .build()
///     .unwrap();
/// assert_eq!(config.renderer, Renderer::Beamer);
/// ```
#[derive(Clone)]
pub struct DeckConfig {
    /// Which composer emits the document. Default: [`Renderer::Pdf`].
    pub renderer: Renderer,

    /// File extensions (without dot) considered images. Default: png, jpg, jpeg, gif.
    pub extensions: Vec<String>,

    /// Number of images decoded and resampled at once by the direct renderer. Default: 4.
    ///
    /// Only preparation is parallel; the PDF itself is assembled on one
    /// thread because pdfium is not re-entrant.
    pub concurrency: usize,

    /// Table geometry for the direct renderer.
    pub layout: LayoutConfig,

    /// LaTeX/Beamer settings for the beamer renderer.
    pub beamer: BeamerOptions,

    /// Allow downloading pdfium when no local copy is found. Default: true.
    pub allow_pdfium_download: bool,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            renderer: Renderer::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            concurrency: 4,
            layout: LayoutConfig::default(),
            beamer: BeamerOptions::default(),
            allow_pdfium_download: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DeckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckConfig")
            .field("renderer", &self.renderer)
            .field("extensions", &self.extensions)
            .field("concurrency", &self.concurrency)
            .field("layout", &self.layout)
            .field("beamer", &self.beamer)
            .field("allow_pdfium_download", &self.allow_pdfium_download)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn DeckProgressCallback>"),
            )
            .finish()
    }
}

impl DeckConfig {
    /// Create a new builder for `DeckConfig`.
    pub fn builder() -> DeckConfigBuilder {
        DeckConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`DeckConfig`].
#[derive(Debug)]
pub struct DeckConfigBuilder {
    config: DeckConfig,
}

impl DeckConfigBuilder {
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.config.renderer = renderer;
        self
    }

    /// Replace the matched extensions. Leading dots are stripped.
    pub fn extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extensions = exts
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    /// Maximum fitted image size in points.
    pub fn max_image_size(mut self, width: f32, height: f32) -> Self {
        self.config.layout.max_image_width = width.max(1.0);
        self.config.layout.max_image_height = height.max(1.0);
        self
    }

    pub fn raster_scale(mut self, scale: f32) -> Self {
        self.config.layout.raster_scale = scale.clamp(0.25, 8.0);
        self
    }

    pub fn beamer(mut self, options: BeamerOptions) -> Self {
        self.config.beamer = options;
        self
    }

    pub fn deck_title(mut self, title: impl Into<String>) -> Self {
        self.config.beamer.title = title.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.config.beamer.author = author.into();
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.config.beamer.theme = theme.into();
        self
    }

    pub fn color_theme(mut self, theme: impl Into<String>) -> Self {
        self.config.beamer.color_theme = theme.into();
        self
    }

    pub fn latex_engine(mut self, program: impl Into<String>) -> Self {
        self.config.beamer.latex_engine = program.into();
        self
    }

    pub fn latex_passes(mut self, passes: u8) -> Self {
        self.config.beamer.passes = passes.clamp(1, 4);
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.beamer.work_dir = Some(dir.into());
        self
    }

    pub fn no_compile(mut self, v: bool) -> Self {
        self.config.beamer.no_compile = v;
        self
    }

    pub fn allow_pdfium_download(mut self, v: bool) -> Self {
        self.config.allow_pdfium_download = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DeckConfig, SlidesError> {
        let c = &self.config;
        if c.extensions.is_empty() {
            return Err(SlidesError::InvalidConfig(
                "At least one image extension is required".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(SlidesError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        c.layout.validate()?;
        if c.beamer.latex_engine.trim().is_empty() {
            return Err(SlidesError::InvalidConfig(
                "LaTeX engine must not be empty".into(),
            ));
        }
        if c.renderer == Renderer::Beamer && c.beamer.no_compile && c.beamer.work_dir.is_none() {
            return Err(SlidesError::InvalidConfig(
                "no_compile needs a work directory to keep the LaTeX sources".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The two interchangeable composers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    /// Table layout drawn straight into a PDF through pdfium. (default)
    #[default]
    Pdf,
    /// Beamer source compiled by an external LaTeX engine.
    Beamer,
}

impl Renderer {
    /// Output filename used when the caller does not pick one.
    pub fn default_output(&self) -> &'static str {
        match self {
            Renderer::Pdf => "comparison.pdf",
            Renderer::Beamer => "comparison_latex.pdf",
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::Pdf => f.write_str("pdf"),
            Renderer::Beamer => f.write_str("beamer"),
        }
    }
}

// ── Direct renderer geometry ─────────────────────────────────────────────

/// Page and table geometry for the direct renderer, in PDF points.
///
/// Defaults reproduce a landscape US Letter page with 30 pt margins and a
/// two-column table of 380 pt columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Width of each of the two table columns.
    pub column_width: f32,
    pub max_image_width: f32,
    pub max_image_height: f32,
    pub title_font_size: f32,
    /// Space between the title baseline block and the table top.
    pub title_gap: f32,
    pub header_font_size: f32,
    pub header_height: f32,
    /// Padding above and below the images in the image row.
    pub cell_padding: f32,
    pub grid_width: f32,
    /// Pixels per point used when resampling images for embedding.
    pub raster_scale: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 792.0,
            page_height: 612.0,
            margin: 30.0,
            column_width: 380.0,
            max_image_width: 380.0,
            max_image_height: 280.0,
            title_font_size: 14.0,
            title_gap: 6.0,
            header_font_size: 12.0,
            header_height: 20.0,
            cell_padding: 3.0,
            grid_width: 1.0,
            raster_scale: 1.0,
        }
    }
}

impl LayoutConfig {
    /// Reject geometry whose table cannot fit on the page.
    pub fn validate(&self) -> Result<(), SlidesError> {
        for (name, value) in [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("column_width", self.column_width),
            ("max_image_width", self.max_image_width),
            ("max_image_height", self.max_image_height),
            ("raster_scale", self.raster_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SlidesError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.max_image_width > self.column_width {
            return Err(SlidesError::InvalidConfig(format!(
                "Images up to {} pt wide do not fit {} pt columns",
                self.max_image_width, self.column_width
            )));
        }
        if 2.0 * self.column_width > self.page_width {
            return Err(SlidesError::InvalidConfig(format!(
                "Two {} pt columns do not fit a {} pt wide page",
                self.column_width, self.page_width
            )));
        }
        let needed = self.margin * 2.0
            + self.title_font_size * 1.2
            + self.title_gap
            + self.header_height
            + self.max_image_height
            + self.cell_padding * 2.0;
        if needed > self.page_height {
            return Err(SlidesError::InvalidConfig(format!(
                "Slide needs {needed} pt of height but the page is {} pt",
                self.page_height
            )));
        }
        Ok(())
    }
}

// ── Beamer renderer options ──────────────────────────────────────────────

/// Settings for the LaTeX/Beamer composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamerOptions {
    pub title: String,
    pub author: String,
    pub theme: String,
    pub color_theme: String,
    /// Value passed as `aspectratio=` to the document class (169 = 16:9).
    pub aspect_ratio: u16,
    /// LaTeX engine executable. Default: `pdflatex`.
    pub latex_engine: String,
    /// Number of compilation passes. Default: 2.
    pub passes: u8,
    /// Keep sources and staged images here instead of a temporary directory.
    pub work_dir: Option<PathBuf>,
    /// Write sources only; compile externally.
    pub no_compile: bool,
}

impl Default for BeamerOptions {
    fn default() -> Self {
        Self {
            title: "Image Comparison".to_string(),
            author: "Generated automatically".to_string(),
            theme: "Madrid".to_string(),
            color_theme: "beaver".to_string(),
            aspect_ratio: 169,
            latex_engine: "pdflatex".to_string(),
            passes: 2,
            work_dir: None,
            no_compile: false,
        }
    }
}
