//! Direct renderer: draw each slide into a new PDF through pdfium.
//!
//! Runs on a blocking thread. pdfium keeps per-thread state, so the whole
//! document is created, filled and saved by the same call.

use crate::config::LayoutConfig;
use crate::error::SlidesError;
use crate::output::SlidePair;
use crate::pipeline::layout::{slide_layout, Rect};
use crate::pipeline::resize::FittedImage;
use crate::pipeline::temp_path;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

const LIGHT_BLUE: (u8, u8, u8) = (0xAD, 0xD8, 0xE6);
const LIGHT_GREEN: (u8, u8, u8) = (0x90, 0xEE, 0x90);

/// A slide whose two images are decoded and fitted.
#[derive(Debug, Clone)]
pub struct PreparedSlide {
    pub pair: SlidePair,
    pub left: FittedImage,
    pub right: FittedImage,
}

fn rgb((r, g, b): (u8, u8, u8)) -> PdfColor {
    PdfColor::new(r, g, b, 255)
}

fn pdf_rect(r: &Rect) -> PdfRect {
    PdfRect::new_from_values(r.bottom, r.left, r.top(), r.right())
}

fn pts(v: f32) -> PdfPoints {
    PdfPoints::new(v)
}

/// Write all slides to `output`, one page each, in the given order.
///
/// The document is saved next to `output` first and renamed into place so an
/// interrupted run never leaves a truncated PDF behind.
pub fn write_pdf(
    pdfium: &Pdfium,
    slides: &[PreparedSlide],
    left_label: &str,
    right_label: &str,
    cfg: &LayoutConfig,
    output: &Path,
) -> Result<(), SlidesError> {
    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| SlidesError::Internal(format!("pdfium could not create a document: {e:?}")))?;
    let font = document.fonts_mut().helvetica_bold();

    for (i, slide) in slides.iter().enumerate() {
        let compose_err = |e: PdfiumError| SlidesError::SlideComposeFailed {
            slide: i + 1,
            file_name: slide.pair.file_name.clone(),
            detail: format!("{e:?}"),
        };

        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                pts(cfg.page_width),
                pts(cfg.page_height),
            ))
            .map_err(compose_err)?;

        draw_slide(&mut page, slide, left_label, right_label, cfg, font).map_err(compose_err)?;
        debug!("Composed slide {} ({})", i + 1, slide.pair.file_name);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SlidesError::OutputWriteFailed {
            path: output.to_path_buf(),
            source: e,
        })?;
    }
    let tmp_path = temp_path(output);
    let saved = document
        .save_to_file(&tmp_path)
        .map_err(|e| std::io::Error::other(format!("{e:?}")))
        .and_then(|()| std::fs::rename(&tmp_path, output));
    if let Err(e) = saved {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(SlidesError::OutputWriteFailed {
            path: output.to_path_buf(),
            source: e,
        });
    }

    info!("Wrote {} slides to {}", slides.len(), output.display());
    Ok(())
}

fn draw_slide(
    page: &mut PdfPage,
    slide: &PreparedSlide,
    left_label: &str,
    right_label: &str,
    cfg: &LayoutConfig,
    font: PdfFontToken,
) -> Result<(), PdfiumError> {
    let layout = slide_layout(
        cfg,
        (slide.left.width_pt, slide.left.height_pt),
        (slide.right.width_pt, slide.right.height_pt),
    );
    let objects = page.objects_mut();

    // Backgrounds first so grid lines and labels sit on top.
    for (cell, colour) in layout.header_cells.iter().zip([LIGHT_BLUE, LIGHT_GREEN]) {
        objects.create_path_object_rect(pdf_rect(cell), None, None, Some(rgb(colour)))?;
    }

    for (fitted, place) in [&slide.left, &slide.right].into_iter().zip(&layout.images) {
        objects.create_image_object(
            pts(place.left),
            pts(place.bottom),
            &fitted.image,
            Some(pts(place.width)),
            Some(pts(place.height)),
        )?;
    }

    let black = PdfColor::new(0, 0, 0, 255);
    for cell in layout.header_cells.iter().chain(&layout.image_cells) {
        objects.create_path_object_rect(
            pdf_rect(cell),
            Some(black),
            Some(pts(cfg.grid_width)),
            None,
        )?;
    }

    let (tx, ty) = layout.title_origin;
    objects.create_text_object(
        pts(tx),
        pts(ty),
        &slide.pair.title,
        font,
        pts(cfg.title_font_size),
    )?;

    for (cell, label) in layout.header_cells.iter().zip([left_label, right_label]) {
        let mut text = objects.create_text_object(
            pts(cell.left),
            pts(layout.header_baseline),
            label,
            font,
            pts(cfg.header_font_size),
        )?;
        let width = text.width()?.value;
        text.translate(pts((cell.width - width).max(0.0) / 2.0), pts(0.0))?;
    }

    Ok(())
}
