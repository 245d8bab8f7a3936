//! Slide geometry for the direct renderer.
//!
//! Pure arithmetic in PDF points with the origin at the bottom-left corner,
//! kept apart from pdfium so the placement rules are unit-testable.
//!
//! ```text
//!  ┌──────────────────────────────────────────────┐
//!  │ Title                                        │
//!  │ ┌────────────────────┬────────────────────┐  │
//!  │ │   left label       │   right label      │  │  header row
//!  │ ├────────────────────┼────────────────────┤  │
//!  │ │     [image]        │      [image]       │  │  image row
//!  │ └────────────────────┴────────────────────┘  │
//!  └──────────────────────────────────────────────┘
//! ```

use crate::config::LayoutConfig;

/// Helvetica cap height as a fraction of the font size.
const CAP_HEIGHT: f32 = 0.718;

/// Axis-aligned rectangle in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn top(&self) -> f32 {
        self.bottom + self.height
    }

    /// A `width × height` rectangle centred inside `self`.
    pub fn centered(&self, width: f32, height: f32) -> Rect {
        Rect {
            left: self.left + (self.width - width) / 2.0,
            bottom: self.bottom + (self.height - height) / 2.0,
            width,
            height,
        }
    }
}

/// Where everything on one slide goes.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    /// Baseline origin of the slide title.
    pub title_origin: (f32, f32),
    /// Left and right header cells.
    pub header_cells: [Rect; 2],
    /// Baseline y of the header labels.
    pub header_baseline: f32,
    /// Left and right image cells.
    pub image_cells: [Rect; 2],
    /// Left and right image placements.
    pub images: [Rect; 2],
}

/// Lay out one slide for images of the given fitted sizes (points).
pub fn slide_layout(cfg: &LayoutConfig, left: (u32, u32), right: (u32, u32)) -> SlideLayout {
    let table_width = cfg.column_width * 2.0;
    let table_left = (cfg.page_width - table_width) / 2.0;

    let title_origin = (cfg.margin, cfg.page_height - cfg.margin - cfg.title_font_size);
    let table_top =
        cfg.page_height - cfg.margin - cfg.title_font_size * 1.2 - cfg.title_gap;

    let header_bottom = table_top - cfg.header_height;
    let header_cells = [0.0, 1.0].map(|col| Rect {
        left: table_left + col * cfg.column_width,
        bottom: header_bottom,
        width: cfg.column_width,
        height: cfg.header_height,
    });
    let header_baseline =
        header_bottom + (cfg.header_height - cfg.header_font_size * CAP_HEIGHT) / 2.0;

    let row_height = left.1.max(right.1) as f32 + cfg.cell_padding * 2.0;
    let row_bottom = header_bottom - row_height;
    let image_cells = [0.0, 1.0].map(|col| Rect {
        left: table_left + col * cfg.column_width,
        bottom: row_bottom,
        width: cfg.column_width,
        height: row_height,
    });

    let images = [
        image_cells[0].centered(left.0 as f32, left.1 as f32),
        image_cells[1].centered(right.0 as f32, right.1 as f32),
    ];

    SlideLayout {
        title_origin,
        header_cells,
        header_baseline,
        image_cells,
        images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn table_is_centred_on_landscape_letter() {
        let l = slide_layout(&LayoutConfig::default(), (380, 190), (380, 280));
        assert!(approx(l.header_cells[0].left, 16.0));
        assert!(approx(l.header_cells[1].right(), 776.0));
        assert!(approx(l.header_cells[0].right(), l.header_cells[1].left));
    }

    #[test]
    fn rows_stack_below_title() {
        let cfg = LayoutConfig::default();
        let l = slide_layout(&cfg, (380, 190), (200, 280));
        assert!(approx(l.title_origin.1, 612.0 - 30.0 - 14.0));
        assert!(l.header_cells[0].top() < l.title_origin.1);
        assert!(approx(l.image_cells[0].top(), l.header_cells[0].bottom));
        assert!(approx(l.image_cells[0].height, 286.0));
        assert!(l.image_cells[0].bottom > cfg.margin);
    }

    #[test]
    fn images_are_centred_in_cells() {
        let l = slide_layout(&LayoutConfig::default(), (380, 190), (200, 280));
        let [left, right] = l.images;
        let [lc, rc] = l.image_cells;
        assert!(approx(left.left, lc.left));
        assert!(approx(left.bottom - lc.bottom, lc.top() - left.top()));
        assert!(approx(right.left - rc.left, rc.right() - right.right()));
        assert!(approx(right.bottom, rc.bottom + 3.0));
    }

    #[test]
    fn header_baseline_inside_header() {
        let l = slide_layout(&LayoutConfig::default(), (10, 10), (10, 10));
        let h = l.header_cells[0];
        assert!(l.header_baseline > h.bottom && l.header_baseline < h.top());
    }
}
