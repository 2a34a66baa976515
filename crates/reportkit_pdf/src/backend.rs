//! PDF serialization of a laid-out display list.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};
use reportkit_core::{ReportError, ReportResult, SpecColor};
use tracing::debug;

use crate::conf::N_MM_PER_PT;
use crate::spec::{EnumDrawOp, SpecRenderedDocument};

const C_LAYER_NAME: &str = "Content";

fn derive_pdf_error_text(err: impl std::fmt::Display) -> ReportError {
    ReportError::Backend(format!("pdf: {err}"))
}

fn convert_color(color: SpecColor) -> Color {
    let (n_r, n_g, n_b) = color.to_rgb_unit();
    Color::Rgb(Rgb::new(n_r, n_g, n_b, None))
}

fn convert_len(n_pt: f32) -> Mm {
    Mm(n_pt * N_MM_PER_PT)
}

/// Display-list `y` (top-down) to PDF `y` (bottom-up), in mm.
fn convert_y(n_pt: f32, n_page_height: f32) -> Mm {
    convert_len(n_page_height - n_pt)
}

struct FontPair {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn write_op(layer: &PdfLayerReference, op: &EnumDrawOp, fonts: &FontPair, n_page_height: f32) {
    match op {
        EnumDrawOp::Text {
            x,
            y,
            size,
            bold,
            color,
            text,
        } => {
            layer.set_fill_color(convert_color(*color));
            let font = if *bold { &fonts.bold } else { &fonts.regular };
            layer.use_text(
                text.as_str(),
                *size,
                convert_len(*x),
                convert_y(*y, n_page_height),
                font,
            );
        }
        EnumDrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let mode = match (fill, stroke) {
                (Some(_), Some(_)) => PaintMode::FillStroke,
                (Some(_), None) => PaintMode::Fill,
                (None, Some(_)) => PaintMode::Stroke,
                (None, None) => return,
            };
            if let Some(color) = fill {
                layer.set_fill_color(convert_color(*color));
            }
            if let Some(color) = stroke {
                layer.set_outline_color(convert_color(*color));
                layer.set_outline_thickness(0.5);
            }
            let rect = Rect::new(
                convert_len(*x),
                convert_y(y + height, n_page_height),
                convert_len(x + width),
                convert_y(*y, n_page_height),
            )
            .with_mode(mode);
            layer.add_rect(rect);
        }
        EnumDrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            thickness,
        } => {
            layer.set_outline_color(convert_color(*color));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (
                        Point::new(convert_len(*x1), convert_y(*y1, n_page_height)),
                        false,
                    ),
                    (
                        Point::new(convert_len(*x2), convert_y(*y2, n_page_height)),
                        false,
                    ),
                ],
                is_closed: false,
            });
        }
    }
}

/// Write every page of `document` into a PDF byte buffer.
///
/// Footer operations are written after the content of each page.
pub fn serialize_document(document: &SpecRenderedDocument) -> ReportResult<Vec<u8>> {
    let geometry = document.geometry;
    let n_width = convert_len(geometry.width);
    let n_height = convert_len(geometry.height);

    let (doc, page_first, layer_first) =
        PdfDocument::new(&document.title, n_width, n_height, C_LAYER_NAME);
    let fonts = FontPair {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(derive_pdf_error_text)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(derive_pdf_error_text)?,
    };

    for (n_idx, page) in document.pages.iter().enumerate() {
        let (page_idx, layer_idx) = if n_idx == 0 {
            (page_first, layer_first)
        } else {
            doc.add_page(n_width, n_height, C_LAYER_NAME)
        };
        let layer = doc.get_page(page_idx).get_layer(layer_idx);
        for op in page.ops.iter().chain(page.ops_footer.iter()) {
            write_op(&layer, op, &fonts, geometry.height);
        }
    }

    let l_bytes = doc.save_to_bytes().map_err(derive_pdf_error_text)?;
    debug!(
        title = %document.title,
        pages = document.pages.len(),
        bytes = l_bytes.len(),
        "pdf serialized"
    );
    Ok(l_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::derive_default_page_geometry;
    use crate::spec::SpecPage;

    #[test]
    fn y_axis_is_flipped() {
        let n_height = 841.89;
        assert!((convert_y(0.0, n_height).0 - convert_len(n_height).0).abs() < 1e-3);
        assert!(convert_y(n_height, n_height).0.abs() < 1e-3);
    }

    #[test]
    fn serializes_every_op_kind() {
        let page = SpecPage {
            ops: vec![
                EnumDrawOp::Text {
                    x: 40.0,
                    y: 60.0,
                    size: 12.0,
                    bold: true,
                    color: SpecColor(0x111827),
                    text: "Cohort Analysis".to_string(),
                },
                EnumDrawOp::Rect {
                    x: 40.0,
                    y: 80.0,
                    width: 100.0,
                    height: 20.0,
                    fill: Some(SpecColor(0xDCFCE7)),
                    stroke: Some(SpecColor(0xE5E7EB)),
                },
                EnumDrawOp::Line {
                    x1: 40.0,
                    y1: 110.0,
                    x2: 200.0,
                    y2: 110.0,
                    color: SpecColor(0x4F46E5),
                    thickness: 1.0,
                },
            ],
            ..Default::default()
        };
        let document = SpecRenderedDocument {
            title: "Test".to_string(),
            geometry: derive_default_page_geometry(),
            pages: vec![page.clone(), page],
        };
        let l_bytes = serialize_document(&document).unwrap();
        assert!(l_bytes.starts_with(b"%PDF"));
    }
}
