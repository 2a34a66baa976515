//! Document renderer models: geometry, layout cursor, display list.

use reportkit_core::SpecColor;
use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////
// #region GeometrySpecification

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecPageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
}

impl SpecPageGeometry {
    /// Drawable width between left and right margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Drawable height between top and bottom margins.
    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Lowest `y` content may reach (`height - margin_bottom`).
    pub fn bottom_bound(&self) -> f32 {
        self.height - self.margin_bottom
    }

    /// Right edge of the content area.
    pub fn right_bound(&self) -> f32 {
        self.width - self.margin_right
    }
}

/// Block sizes used by the drawing primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecDocumentOptions {
    pub geometry: SpecPageGeometry,
    /// Side of the square logo block.
    pub size_logo: f32,
    /// Height consumed by the document header (logo, titles, divider).
    pub height_header_block: f32,
    pub font_size_title: f32,
    pub font_size_subtitle: f32,
    pub font_size_section: f32,
    /// Height consumed by a section title and its underline.
    pub height_section_title: f32,
    /// Fixed stat card height.
    pub height_card: f32,
    /// Horizontal gap between stat cards.
    pub gutter_card: f32,
    /// Narrowest stat card; a row that would go below it is rejected.
    pub width_card_min: f32,
    /// Total bar chart area height, labels included.
    pub height_chart: f32,
    pub width_bar_max: f32,
    pub height_legend_row: f32,
    pub size_swatch: f32,
    /// Vertical gap appended after every block.
    pub gap_block: f32,
    /// Footer divider distance below the bottom bound.
    pub offset_footer_divider: f32,
    /// Footer text baseline distance below the bottom bound.
    pub offset_footer_text: f32,
}

impl Default for SpecDocumentOptions {
    fn default() -> Self {
        crate::conf::derive_default_document_options()
    }
}

/// Cursor state of the page being drawn.
///
/// `cursor_y` grows downward from the top edge and never passes
/// `page height - margin_bottom` without a page break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecPageLayout {
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub content_width: f32,
    pub content_height: f32,
    pub cursor_y: f32,
    /// Zero-based index of the current page.
    pub page_index: usize,
}

impl SpecPageLayout {
    /// Fresh layout positioned at the top of page 0.
    pub fn new(geometry: &SpecPageGeometry) -> Self {
        Self {
            margin_top: geometry.margin_top,
            margin_right: geometry.margin_right,
            margin_bottom: geometry.margin_bottom,
            margin_left: geometry.margin_left,
            content_width: geometry.content_width(),
            content_height: geometry.content_height(),
            cursor_y: geometry.margin_top,
            page_index: 0,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DisplayList

/// One drawing operation; coordinates are points from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumDrawOp {
    /// Text whose baseline starts at `(x, y)`.
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: SpecColor,
        text: String,
    },
    /// Axis-aligned rectangle with top-left corner `(x, y)`.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<SpecColor>,
        stroke: Option<SpecColor>,
    },
    /// Straight segment.
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: SpecColor,
        thickness: f32,
    },
}

impl EnumDrawOp {
    /// Lowest `y` touched by this operation.
    pub fn y_max(&self) -> f32 {
        match self {
            Self::Text { y, .. } => *y,
            Self::Rect { y, height, .. } => y + height,
            Self::Line { y1, y2, .. } => y1.max(*y2),
        }
    }

    /// Text payload, if this is a text op.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Page number/total recorded by the footer pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecFooterStamp {
    /// One-based page number.
    pub page_number: usize,
    pub total_pages: usize,
}

/// Ordered operations of one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecPage {
    /// Content operations (header and sections).
    pub ops: Vec<EnumDrawOp>,
    /// Footer operations, drawn in the bottom margin.
    pub ops_footer: Vec<EnumDrawOp>,
    /// Set once by the footer pass.
    pub footer: Option<SpecFooterStamp>,
}

impl SpecPage {
    /// Every text string on the page, content first.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .chain(self.ops_footer.iter())
            .filter_map(EnumDrawOp::text)
            .collect()
    }
}

/// Finished display list ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRenderedDocument {
    pub title: String,
    pub geometry: SpecPageGeometry,
    pub pages: Vec<SpecPage>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
