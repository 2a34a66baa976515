//! Page geometry constants and default preset factories.

use crate::spec::{SpecDocumentOptions, SpecPageGeometry};

/// A4 width in points.
pub const N_PAGE_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const N_PAGE_HEIGHT: f32 = 841.89;
/// Margin on every side.
pub const N_MARGIN: f32 = 40.0;
/// Millimetres per point.
pub const N_MM_PER_PT: f32 = 25.4 / 72.0;

/// Default A4 geometry.
pub fn derive_default_page_geometry() -> SpecPageGeometry {
    SpecPageGeometry {
        width: N_PAGE_WIDTH,
        height: N_PAGE_HEIGHT,
        margin_top: N_MARGIN,
        margin_right: N_MARGIN,
        margin_bottom: N_MARGIN,
        margin_left: N_MARGIN,
    }
}

/// Default block sizes.
pub fn derive_default_document_options() -> SpecDocumentOptions {
    SpecDocumentOptions {
        geometry: derive_default_page_geometry(),
        size_logo: 36.0,
        height_header_block: 62.0,
        font_size_title: 18.0,
        font_size_subtitle: 10.0,
        font_size_section: 13.0,
        height_section_title: 29.0,
        height_card: 64.0,
        gutter_card: 12.0,
        width_card_min: 60.0,
        height_chart: 150.0,
        width_bar_max: 40.0,
        height_legend_row: 16.0,
        size_swatch: 10.0,
        gap_block: 14.0,
        offset_footer_divider: 10.0,
        offset_footer_text: 24.0,
    }
}
