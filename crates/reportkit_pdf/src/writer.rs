//! Drawing primitives and the section layout pass.

use chrono::{DateTime, Utc};
use reportkit_core::style::{
    color_for_cell, color_for_threshold, color_for_trend, table_style_variant,
};
use reportkit_core::util::{
    derive_column_align, derive_matrix_table, derive_totals_row, format_cell_text, format_trend,
    validate_report,
};
use reportkit_core::{
    EnumAlign, EnumSectionKind, EnumTableCell, EnumTableVariant, ReportError, ReportResult,
    SpecBarPoint, SpecCohortMatrix, SpecCohortRow, SpecColor, SpecColorRule, SpecReport,
    SpecStatCard, SpecTable, SpecTheme,
};
use tracing::debug;

use crate::backend::serialize_document;
use crate::layout::{
    N_FONT_SIZE_LEGEND, estimate_text_width, measure_legend, measure_section, plan_column_widths,
    plan_legend_items, truncate_text_to_width,
};
use crate::spec::{
    EnumDrawOp, SpecDocumentOptions, SpecFooterStamp, SpecPage, SpecPageLayout,
    SpecRenderedDocument,
};

/// Immediate-mode canvas over a growing list of pages.
///
/// Every content primitive takes the current `y` and returns the advanced one.
/// Only [`DocumentCanvas::add_table`] may open a page by itself; the other
/// primitives refuse to draw past the bottom bound.
pub struct DocumentCanvas<'a> {
    theme: &'a SpecTheme,
    options: SpecDocumentOptions,
    title: String,
    generated_at: DateTime<Utc>,
    pages: Vec<SpecPage>,
    layout: SpecPageLayout,
    if_header_drawn: bool,
}

impl<'a> DocumentCanvas<'a> {
    /// Canvas with one empty page.
    pub fn new(
        theme: &'a SpecTheme,
        options: SpecDocumentOptions,
        title: &str,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            theme,
            layout: SpecPageLayout::new(&options.geometry),
            options,
            title: title.to_string(),
            generated_at,
            pages: vec![SpecPage::default()],
            if_header_drawn: false,
        }
    }

    /// Current cursor state.
    pub fn layout(&self) -> &SpecPageLayout {
        &self.layout
    }

    /// Pages drawn so far.
    pub fn pages(&self) -> &[SpecPage] {
        &self.pages
    }

    /// Space left between `y` and the bottom bound.
    pub fn available_from(&self, y: f32) -> f32 {
        self.options.geometry.bottom_bound() - y
    }

    /// Space on a fresh page.
    pub fn available_on_fresh_page(&self) -> f32 {
        self.options.geometry.content_height()
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region Bookkeeping

    fn push(&mut self, op: EnumDrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn push_text(&mut self, x: f32, y: f32, size: f32, bold: bool, color: SpecColor, text: &str) {
        self.push(EnumDrawOp::Text {
            x,
            y,
            size,
            bold,
            color,
            text: text.to_string(),
        });
    }

    fn push_rect(
        &mut self,
        (x, y, width, height): (f32, f32, f32, f32),
        fill: Option<SpecColor>,
        stroke: Option<SpecColor>,
    ) {
        self.push(EnumDrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        });
    }

    fn push_line(
        &mut self,
        (x1, y1, x2, y2): (f32, f32, f32, f32),
        color: SpecColor,
        thickness: f32,
    ) {
        self.push(EnumDrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            thickness,
        });
    }

    fn advance(&mut self, y: f32) -> f32 {
        let n_y = y.min(self.options.geometry.bottom_bound());
        self.layout.cursor_y = n_y;
        n_y
    }

    fn check_fits(&self, section: &str, y: f32, needed: f32) -> ReportResult<()> {
        let n_available = self.available_from(y);
        if needed > n_available + f32::EPSILON {
            return Err(ReportError::Overflow {
                section: section.to_string(),
                needed,
                available: n_available.max(0.0),
            });
        }
        Ok(())
    }

    /// Explicit page break; returns the top `y` of the new page.
    pub fn add_page(&mut self) -> f32 {
        self.pages.push(SpecPage::default());
        self.layout.page_index = self.pages.len() - 1;
        self.layout.cursor_y = self.options.geometry.margin_top;
        debug!(page_index = self.layout.page_index, "document page break");
        self.layout.cursor_y
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region HeaderFooter

    /// Logo block, title, subtitle, generation date and divider.
    ///
    /// Returns the first usable content `y`.
    pub fn add_header(&mut self, title: &str, subtitle: Option<&str>) -> ReportResult<f32> {
        if self.if_header_drawn {
            return Err(ReportError::invalid("header", "document header already drawn"));
        }
        let theme = self.theme;
        let palette = &theme.palette;
        let geometry = self.options.geometry;
        let n_top = geometry.margin_top;
        let n_left = geometry.margin_left;
        let n_logo = self.options.size_logo;

        self.push_rect((n_left, n_top, n_logo, n_logo), Some(palette.primary), None);
        let n_logo_font = 12.0;
        let n_logo_text_width = estimate_text_width(&theme.logo_text, n_logo_font, true);
        self.push_text(
            n_left + (n_logo - n_logo_text_width) / 2.0,
            n_top + n_logo / 2.0 + n_logo_font * 0.35,
            n_logo_font,
            true,
            SpecColor::WHITE,
            &theme.logo_text,
        );

        let n_text_x = n_left + n_logo + 12.0;
        let n_date_size = 9.0;
        let c_date = format!("Generated {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"));
        let n_date_width = estimate_text_width(&c_date, n_date_size, false);
        let n_title_width_max = geometry.right_bound() - n_text_x - n_date_width - 12.0;
        let c_title = truncate_text_to_width(
            title,
            self.options.font_size_title,
            true,
            n_title_width_max,
        );
        self.push_text(
            n_text_x,
            n_top + 16.0,
            self.options.font_size_title,
            true,
            palette.text,
            &c_title,
        );
        if let Some(c_subtitle) = subtitle {
            let c_subtitle = truncate_text_to_width(
                c_subtitle,
                self.options.font_size_subtitle,
                false,
                n_title_width_max,
            );
            self.push_text(
                n_text_x,
                n_top + 31.0,
                self.options.font_size_subtitle,
                false,
                palette.text_muted,
                &c_subtitle,
            );
        }
        self.push_text(
            geometry.right_bound() - n_date_width,
            n_top + 16.0,
            n_date_size,
            false,
            palette.text_muted,
            &c_date,
        );

        let n_divider_y = n_top + n_logo + 10.0;
        self.push_line(
            (n_left, n_divider_y, geometry.right_bound(), n_divider_y),
            palette.primary,
            1.5,
        );

        self.if_header_drawn = true;
        Ok(self.advance(n_top + self.options.height_header_block))
    }

    /// Divider, `Page X of Y` and brand string below the bottom margin.
    ///
    /// `page_index` is zero-based. Meant for the finishing pass once
    /// `total_pages` is known.
    pub fn add_footer(&mut self, page_index: usize, total_pages: usize) -> ReportResult<()> {
        if page_index >= self.pages.len() || total_pages != self.pages.len() {
            return Err(ReportError::invalid(
                "footer",
                format!(
                    "page {page_index} of {total_pages} does not match {} drawn pages",
                    self.pages.len()
                ),
            ));
        }
        let geometry = self.options.geometry;
        let theme = self.theme;
        let palette = &theme.palette;
        let n_divider_y = geometry.bottom_bound() + self.options.offset_footer_divider;
        let n_text_y = geometry.bottom_bound() + self.options.offset_footer_text;
        let n_size = 8.0;
        let c_page = format!("Page {} of {}", page_index + 1, total_pages);
        let n_page_width = estimate_text_width(&c_page, n_size, false);

        let page = &mut self.pages[page_index];
        page.ops_footer.clear();
        page.ops_footer.push(EnumDrawOp::Line {
            x1: geometry.margin_left,
            y1: n_divider_y,
            x2: geometry.right_bound(),
            y2: n_divider_y,
            color: palette.border,
            thickness: 0.5,
        });
        page.ops_footer.push(EnumDrawOp::Text {
            x: geometry.margin_left,
            y: n_text_y,
            size: n_size,
            bold: false,
            color: palette.text_muted,
            text: theme.brand.clone(),
        });
        page.ops_footer.push(EnumDrawOp::Text {
            x: geometry.right_bound() - n_page_width,
            y: n_text_y,
            size: n_size,
            bold: false,
            color: palette.text_muted,
            text: c_page,
        });
        page.footer = Some(SpecFooterStamp {
            page_number: page_index + 1,
            total_pages,
        });
        Ok(())
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region ContentPrimitives

    /// Section title with an underline sized to the text.
    pub fn add_section_title(&mut self, title: &str, y: f32) -> ReportResult<f32> {
        self.check_fits(title, y, self.options.height_section_title)?;
        let geometry = self.options.geometry;
        let n_size = self.options.font_size_section;
        let c_title = truncate_text_to_width(title, n_size, true, geometry.content_width());
        let n_width = estimate_text_width(&c_title, n_size, true);
        let color = self.theme.palette.primary;

        self.push_text(geometry.margin_left, y + 14.0, n_size, true, color, &c_title);
        self.push_line(
            (geometry.margin_left, y + 19.0, geometry.margin_left + n_width, y + 19.0),
            color,
            1.5,
        );
        Ok(self.advance(y + self.options.height_section_title))
    }

    /// Row of equal-width KPI cards spanning the content width.
    pub fn add_stat_cards(&mut self, cards: &[SpecStatCard], y: f32) -> ReportResult<f32> {
        if cards.is_empty() {
            return Err(ReportError::invalid("stat_cards", "no cards to draw"));
        }
        self.check_fits(
            "stat_cards",
            y,
            self.options.height_card + self.options.gap_block,
        )?;

        let theme = self.theme;
        let palette = &theme.palette;
        let geometry = self.options.geometry;
        let n_cards = cards.len() as f32;
        let n_gutter = self.options.gutter_card;
        let n_card_width = (geometry.content_width() - (n_cards - 1.0) * n_gutter) / n_cards;
        if n_card_width < self.options.width_card_min {
            return Err(ReportError::Overflow {
                section: "stat_cards".to_string(),
                needed: n_cards * self.options.width_card_min + (n_cards - 1.0) * n_gutter,
                available: geometry.content_width(),
            });
        }
        let n_height = self.options.height_card;
        let n_text_width = n_card_width - 20.0;

        for (n_idx, card) in cards.iter().enumerate() {
            let n_x = geometry.margin_left + n_idx as f32 * (n_card_width + n_gutter);
            self.push_rect(
                (n_x, y, n_card_width, n_height),
                Some(palette.surface),
                Some(palette.border),
            );
            let c_label = truncate_text_to_width(&card.label, 8.0, false, n_text_width);
            self.push_text(n_x + 10.0, y + 18.0, 8.0, false, palette.text_muted, &c_label);
            let c_value = truncate_text_to_width(&card.value, 14.0, true, n_text_width);
            self.push_text(n_x + 10.0, y + 38.0, 14.0, true, palette.text, &c_value);
            if let Some(n_trend) = card.trend {
                let color = color_for_trend(n_trend, theme).foreground;
                self.push_text(n_x + 10.0, y + 54.0, 8.0, true, color, &format_trend(n_trend));
            }
        }
        Ok(self.advance(y + n_height + self.options.gap_block))
    }

    fn draw_table_header(
        &mut self,
        headers: &[String],
        l_widths: &[f32],
        y: f32,
        variant: EnumTableVariant,
    ) -> f32 {
        let style = table_style_variant(variant);
        let n_left = self.options.geometry.margin_left;
        let n_width_total: f32 = l_widths.iter().sum();
        let theme = self.theme;
        let palette = &theme.palette;

        self.push_rect(
            (n_left, y, n_width_total, style.height_header),
            Some(palette.primary),
            None,
        );
        let mut n_x = n_left;
        for (header, n_width) in headers.iter().zip(l_widths) {
            let c_text = truncate_text_to_width(
                header,
                style.font_size_header,
                true,
                n_width - 2.0 * style.padding_cell,
            );
            self.push_text(
                n_x + style.padding_cell,
                y + style.height_header / 2.0 + style.font_size_header * 0.35,
                style.font_size_header,
                true,
                SpecColor::WHITE,
                &c_text,
            );
            n_x += n_width;
        }
        y + style.height_header
    }

    fn draw_table_row(
        &mut self,
        table: &SpecTable,
        row: &[EnumTableCell],
        l_widths: &[f32],
        y: f32,
        fill_row: Option<SpecColor>,
        if_bold: bool,
    ) -> f32 {
        let style = table_style_variant(table.variant);
        let n_left = self.options.geometry.margin_left;
        let n_width_total: f32 = l_widths.iter().sum();
        let theme = self.theme;
        let palette = &theme.palette;

        if fill_row.is_some() {
            self.push_rect((n_left, y, n_width_total, style.height_row), fill_row, None);
        }

        let mut n_x = n_left;
        for (n_idx_col, (cell, n_width)) in row.iter().zip(l_widths).enumerate() {
            let colors = color_for_cell(cell, theme);
            if style.if_fill_coded
                && let Some(pair) = colors
            {
                self.push_rect(
                    (n_x + 1.0, y + 1.0, n_width - 2.0, style.height_row - 2.0),
                    Some(pair.background),
                    None,
                );
            }
            let color_text = colors.map_or(palette.text, |pair| pair.foreground);
            let c_text = truncate_text_to_width(
                &format_cell_text(cell),
                style.font_size_body,
                if_bold,
                n_width - 2.0 * style.padding_cell,
            );
            let n_text_width = estimate_text_width(&c_text, style.font_size_body, if_bold);
            let n_text_x = match derive_column_align(table, n_idx_col, style.align_body) {
                EnumAlign::Left => n_x + style.padding_cell,
                EnumAlign::Center => n_x + (n_width - n_text_width) / 2.0,
                EnumAlign::Right => n_x + n_width - style.padding_cell - n_text_width,
            };
            self.push_text(
                n_text_x,
                y + style.height_row / 2.0 + style.font_size_body * 0.35,
                style.font_size_body,
                if_bold,
                color_text,
                &c_text,
            );
            n_x += n_width;
        }

        self.push_line(
            (n_left, y + style.height_row, n_left + n_width_total, y + style.height_row),
            palette.border,
            0.5,
        );
        y + style.height_row
    }

    /// Generic table primitive; continues on new pages as rows run out of room.
    ///
    /// The header row is repeated at the top of every continuation page.
    pub fn add_table(
        &mut self,
        headers: &[String],
        rows: &[Vec<EnumTableCell>],
        y: f32,
        variant: EnumTableVariant,
    ) -> ReportResult<f32> {
        let table = SpecTable {
            headers: headers.to_vec(),
            rows: rows.to_vec(),
            column_hints: None,
            variant,
            if_totals: false,
        };
        self.draw_table(&table, y)
    }

    /// Like [`Self::add_table`] but honors column hints and the totals flag.
    pub fn draw_table(&mut self, table: &SpecTable, y: f32) -> ReportResult<f32> {
        if table.headers.is_empty() {
            return Err(ReportError::invalid("table.headers", "table needs at least one column"));
        }
        let style = table_style_variant(table.variant);
        if style.height_header + style.height_row > self.available_on_fresh_page() {
            return Err(ReportError::Overflow {
                section: "table".to_string(),
                needed: style.height_header + style.height_row,
                available: self.available_on_fresh_page(),
            });
        }

        let l_widths = plan_column_widths(table, &style, self.options.geometry.content_width());
        let mut n_y = y;
        if n_y + style.height_header + style.height_row > self.options.geometry.bottom_bound() {
            n_y = self.add_page();
        }
        n_y = self.draw_table_header(&table.headers, &l_widths, n_y, table.variant);

        let l_totals = table.if_totals.then(|| derive_totals_row(table));
        let n_rows_total = table.rows.len() + usize::from(l_totals.is_some());
        for n_idx_row in 0..n_rows_total {
            if n_y + style.height_row > self.options.geometry.bottom_bound() {
                n_y = self.add_page();
                n_y = self.draw_table_header(&table.headers, &l_widths, n_y, table.variant);
            }
            if let Some(row) = table.rows.get(n_idx_row) {
                let fill_row = (style.if_banded && n_idx_row % 2 == 1)
                    .then_some(self.theme.palette.band);
                n_y = self.draw_table_row(table, row, &l_widths, n_y, fill_row, false);
            } else if let Some(l_row_totals) = &l_totals {
                let n_left = self.options.geometry.margin_left;
                let n_width_total: f32 = l_widths.iter().sum();
                let color_border = self.theme.palette.text_muted;
                self.push_line((n_left, n_y, n_left + n_width_total, n_y), color_border, 1.2);
                let fill = Some(self.theme.palette.total_fill);
                n_y = self.draw_table_row(table, l_row_totals, &l_widths, n_y, fill, true);
            }
        }

        let n_y_end = n_y + self.options.gap_block;
        Ok(self.advance(n_y_end))
    }

    /// Cohort retention matrix; month cells colored by the retention rule.
    pub fn add_matrix(&mut self, cohort_rows: &[SpecCohortRow], y: f32) -> ReportResult<f32> {
        let table = derive_matrix_table(&SpecCohortMatrix {
            rows: cohort_rows.to_vec(),
        });
        self.draw_table(&table, y)
    }

    /// Vertical bars scaled to `value / 100` of the bar area height.
    pub fn add_bar_series(&mut self, points: &[SpecBarPoint], y: f32) -> ReportResult<f32> {
        if points.is_empty() {
            return Err(ReportError::invalid("bar_series", "no points to draw"));
        }
        let n_height_chart = self.options.height_chart;
        self.check_fits("bar_series", y, n_height_chart + self.options.gap_block)?;

        let theme = self.theme;
        let palette = &theme.palette;
        let geometry = self.options.geometry;
        let n_label_top = 14.0;
        let n_label_bottom = 16.0;
        let n_bar_max = n_height_chart - n_label_top - n_label_bottom;
        let n_base_y = y + n_label_top + n_bar_max;
        let n_slot = geometry.content_width() / points.len() as f32;
        let n_bar_width = (n_slot * 0.6).min(self.options.width_bar_max);

        self.push_line(
            (geometry.margin_left, n_base_y, geometry.right_bound(), n_base_y),
            palette.border,
            0.8,
        );
        for (n_idx, point) in points.iter().enumerate() {
            let n_value = point.value.clamp(0.0, 100.0) as f32;
            let n_bar_height = n_value / 100.0 * n_bar_max;
            let n_slot_x = geometry.margin_left + n_idx as f32 * n_slot;
            let n_bar_x = n_slot_x + (n_slot - n_bar_width) / 2.0;
            let colors = color_for_threshold(Some(point.value), &theme.rule_retention);
            self.push_rect(
                (n_bar_x, n_base_y - n_bar_height, n_bar_width, n_bar_height),
                Some(colors.foreground),
                None,
            );

            let c_value = format!("{:.1}%", point.value);
            let n_value_width = estimate_text_width(&c_value, 7.5, true);
            self.push_text(
                n_slot_x + (n_slot - n_value_width) / 2.0,
                n_base_y - n_bar_height - 3.0,
                7.5,
                true,
                palette.text,
                &c_value,
            );
            let c_label = truncate_text_to_width(&point.label, 7.5, false, n_slot - 4.0);
            let n_label_width = estimate_text_width(&c_label, 7.5, false);
            self.push_text(
                n_slot_x + (n_slot - n_label_width) / 2.0,
                n_base_y + 11.0,
                7.5,
                false,
                palette.text_muted,
                &c_label,
            );
        }
        Ok(self.advance(y + n_height_chart + self.options.gap_block))
    }

    /// One swatch and label per bucket, in rule order, then the undefined entry.
    pub fn add_legend(&mut self, rule: &SpecColorRule, y: f32) -> ReportResult<f32> {
        let geometry = self.options.geometry;
        let n_needed = measure_legend(rule, &self.options, geometry.content_width());
        self.check_fits("legend", y, n_needed)?;

        let n_row_height = self.options.height_legend_row;
        let n_swatch = self.options.size_swatch;
        let color_border = self.theme.palette.border;
        for item in plan_legend_items(rule, &self.options, geometry.content_width()) {
            let n_x = geometry.margin_left + item.x_offset;
            let n_row_y = y + item.row as f32 * n_row_height;
            self.push_rect(
                (n_x, n_row_y + 2.0, n_swatch, n_swatch),
                Some(item.colors.background),
                Some(color_border),
            );
            self.push_text(
                n_x + n_swatch + 4.0,
                n_row_y + 2.0 + n_swatch * 0.85,
                N_FONT_SIZE_LEGEND,
                false,
                item.colors.foreground,
                &item.label,
            );
        }
        Ok(self.advance(y + n_needed))
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Finishing

    /// Run the footer pass over every page and hand back the display list.
    pub fn finish(mut self) -> ReportResult<SpecRenderedDocument> {
        let n_total = self.pages.len();
        for n_idx in 0..n_total {
            self.add_footer(n_idx, n_total)?;
        }
        Ok(SpecRenderedDocument {
            title: self.title,
            geometry: self.options.geometry,
            pages: self.pages,
        })
    }

    // #endregion
}

/// Measure-then-paint layout pass over the report sections.
///
/// A section whose title plus minimum body does not fit the remaining space
/// starts on a new page. Fixed-height sections taller than a whole page are
/// rejected with [`ReportError::Overflow`].
pub fn layout_document(
    report: &SpecReport,
    theme: &SpecTheme,
    options: &SpecDocumentOptions,
) -> ReportResult<SpecRenderedDocument> {
    validate_report(report, theme)?;

    let mut canvas = DocumentCanvas::new(theme, *options, &report.title, report.generated_at);
    let mut n_y = canvas.add_header(&report.title, report.subtitle.as_deref())?;

    for section in &report.sections {
        let measure = measure_section(&section.kind, theme, options);
        let n_needed_start = options.height_section_title + measure.height_min;
        if n_needed_start > canvas.available_on_fresh_page() {
            return Err(ReportError::Overflow {
                section: section.title.clone(),
                needed: n_needed_start,
                available: canvas.available_on_fresh_page(),
            });
        }
        if n_needed_start > canvas.available_from(n_y) {
            debug!(
                section = %section.title,
                needed = n_needed_start,
                available = canvas.available_from(n_y),
                "section moved to next page"
            );
            n_y = canvas.add_page();
        }

        n_y = canvas.add_section_title(&section.title, n_y)?;
        n_y = match &section.kind {
            EnumSectionKind::StatCards(cards) => canvas.add_stat_cards(cards, n_y)?,
            EnumSectionKind::Table(table) => canvas.draw_table(table, n_y)?,
            EnumSectionKind::Matrix(matrix) => canvas.add_matrix(&matrix.rows, n_y)?,
            EnumSectionKind::BarSeries(points) => canvas.add_bar_series(points, n_y)?,
            EnumSectionKind::Legend(source) => canvas.add_legend(source.resolve(theme), n_y)?,
        };
    }

    let document = canvas.finish()?;
    debug!(
        title = %document.title,
        pages = document.pages.len(),
        "document laid out"
    );
    Ok(document)
}

/// Validate, lay out and serialize a report to PDF bytes.
pub fn render_document(
    report: &SpecReport,
    theme: &SpecTheme,
    options: &SpecDocumentOptions,
) -> ReportResult<Vec<u8>> {
    let document = layout_document(report, theme, options)?;
    serialize_document(&document)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use reportkit_core::{
        EnumLegendSource, SpecColorBucket, SpecColorPair, SpecReportSection,
        derive_default_theme,
    };

    use super::*;
    use crate::conf::derive_default_document_options;

    fn build_report(sections: Vec<(&str, EnumSectionKind)>) -> SpecReport {
        SpecReport {
            report_type: "CohortAnalysis".to_string(),
            title: "Cohort Analysis".to_string(),
            subtitle: Some("Monthly retention by join cohort".to_string()),
            date_range: Some("30d".to_string()),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
            sections: sections
                .into_iter()
                .map(|(title, kind)| SpecReportSection {
                    title: title.to_string(),
                    kind,
                })
                .collect(),
        }
    }

    fn build_segment_table(n_rows: usize) -> SpecTable {
        SpecTable {
            headers: vec!["Segment".to_string(), "Users".to_string(), "LTV".to_string()],
            rows: (0..n_rows)
                .map(|n_idx| {
                    vec![
                        EnumTableCell::Text(format!("Segment {n_idx}")),
                        EnumTableCell::Count(100.0 + n_idx as f64),
                        EnumTableCell::Currency(25.5 * n_idx as f64),
                    ]
                })
                .collect(),
            ..Default::default()
        }
    }

    fn build_cohort_matrix() -> SpecCohortMatrix {
        let l_months = [
            vec![Some(100.0), Some(65.0), Some(52.0), Some(41.0), Some(33.0), Some(28.0)],
            vec![Some(100.0), Some(61.0), Some(47.0), Some(39.0), Some(30.0)],
            vec![Some(100.0), Some(58.0), Some(44.0), Some(31.0)],
            vec![Some(100.0), Some(55.0), Some(20.0)],
            vec![Some(100.0), Some(49.0)],
            vec![Some(100.0)],
        ];
        SpecCohortMatrix {
            rows: l_months
                .into_iter()
                .enumerate()
                .map(|(n_idx, months)| SpecCohortRow {
                    period: format!("2026-0{}", n_idx + 3),
                    users: 1000 - 50 * n_idx as u64,
                    months,
                    revenue: 12000.0 - 900.0 * n_idx as f64,
                })
                .collect(),
        }
    }

    fn assert_content_within_bounds(document: &SpecRenderedDocument) {
        let n_bottom = document.geometry.bottom_bound();
        for (n_idx, page) in document.pages.iter().enumerate() {
            for op in &page.ops {
                assert!(
                    op.y_max() <= n_bottom + 1e-3,
                    "page {n_idx}: {op:?} passes the bottom bound {n_bottom}"
                );
            }
            for op in &page.ops_footer {
                assert!(op.y_max() > n_bottom);
            }
        }
    }

    #[test]
    fn every_page_gets_one_footer_with_final_count() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let report = build_report(vec![("Segments", EnumSectionKind::Table(build_segment_table(90)))]);

        let document = layout_document(&report, &theme, &options).unwrap();
        let n_pages = document.pages.len();
        assert!(n_pages >= 3);
        for (n_idx, page) in document.pages.iter().enumerate() {
            assert_eq!(
                page.footer,
                Some(SpecFooterStamp {
                    page_number: n_idx + 1,
                    total_pages: n_pages,
                })
            );
            let c_expected = format!("Page {} of {}", n_idx + 1, n_pages);
            assert_eq!(
                page.texts().into_iter().filter(|c| **c == c_expected).count(),
                1
            );
        }
        assert_content_within_bounds(&document);
    }

    #[test]
    fn continued_table_repeats_header_on_each_page() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let report = build_report(vec![("Segments", EnumSectionKind::Table(build_segment_table(90)))]);

        let document = layout_document(&report, &theme, &options).unwrap();
        for page in &document.pages {
            assert_eq!(page.texts().into_iter().filter(|c| *c == "Segment").count(), 1);
        }
        let n_body_rows: usize = document
            .pages
            .iter()
            .map(|page| {
                page.texts()
                    .into_iter()
                    .filter(|c| c.starts_with("Segment ") && !c.contains("Segments"))
                    .count()
            })
            .sum();
        assert_eq!(n_body_rows, 90);
    }

    #[test]
    fn cohort_matrix_has_nine_columns_and_colored_months() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let report = build_report(vec![
            ("Cohort Retention", EnumSectionKind::Matrix(build_cohort_matrix())),
            ("Legend", EnumSectionKind::Legend(EnumLegendSource::Retention)),
        ]);

        let document = layout_document(&report, &theme, &options).unwrap();
        assert_eq!(document.pages.len(), 1);
        let l_texts = document.pages[0].texts();
        for c_header in ["Cohort", "Users", "Month 1", "Month 6", "Revenue"] {
            assert!(l_texts.contains(&c_header), "missing header {c_header}");
        }
        for n_idx in 0..6 {
            let c_period = format!("2026-0{}", n_idx + 3);
            assert!(l_texts.contains(&c_period.as_str()));
        }

        let rule = &theme.rule_retention;
        let l_ops = &document.pages[0].ops;
        let if_has_text = |c_text: &str, pair: SpecColorPair| {
            l_ops.iter().any(|op| {
                matches!(op, EnumDrawOp::Text { text, color, .. } if text == c_text && *color == pair.foreground)
            })
        };
        let if_has_fill = |pair: SpecColorPair| {
            l_ops.iter().any(|op| {
                matches!(op, EnumDrawOp::Rect { fill: Some(fill), .. } if *fill == pair.background)
            })
        };

        let pair_65 = color_for_threshold(Some(65.0), rule);
        assert!(if_has_text("65.0%", pair_65));
        assert!(if_has_fill(pair_65));
        let pair_20 = color_for_threshold(Some(20.0), rule);
        assert!(if_has_text("20.0%", pair_20));
        assert!(if_has_fill(pair_20));

        // 15 of 36 month cells have not elapsed yet.
        let n_absent = l_ops
            .iter()
            .filter(|op| {
                matches!(op, EnumDrawOp::Text { text, color, .. } if text == "-" && *color == rule.undefined.foreground)
            })
            .count();
        assert_eq!(n_absent, 15);
        assert!(if_has_fill(rule.undefined));
        assert!(!l_texts.contains(&"0.0%"));
        assert_content_within_bounds(&document);
    }

    #[test]
    fn legend_entries_follow_rule_order() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let report = build_report(vec![("Legend", EnumSectionKind::Legend(EnumLegendSource::Retention))]);

        let document = layout_document(&report, &theme, &options).unwrap();
        let l_texts = document.pages[0].texts();
        let l_positions: Vec<usize> = theme
            .rule_retention
            .buckets
            .iter()
            .map(|bucket| bucket.label.as_str())
            .chain(std::iter::once(theme.rule_retention.label_undefined.as_str()))
            .map(|c_label| l_texts.iter().position(|c| *c == c_label).unwrap())
            .collect();
        assert!(l_positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn stat_cards_that_do_not_fit_move_to_next_page() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let report = build_report(vec![
            ("Segments", EnumSectionKind::Table(build_segment_table(28))),
            (
                "Highlights",
                EnumSectionKind::StatCards(vec![
                    SpecStatCard {
                        label: "Active traders".to_string(),
                        value: "1,284".to_string(),
                        trend: Some(3.0),
                    },
                    SpecStatCard {
                        label: "Churned".to_string(),
                        value: "212".to_string(),
                        trend: Some(-15.2),
                    },
                ]),
            ),
        ]);

        let document = layout_document(&report, &theme, &options).unwrap();
        assert_eq!(document.pages.len(), 2);
        assert!(!document.pages[0].texts().contains(&"Active traders"));
        let l_texts = document.pages[1].texts();
        assert!(l_texts.contains(&"Highlights"));
        assert!(l_texts.contains(&"Active traders"));
        assert!(document.pages[1].ops.iter().any(|op| {
            matches!(op, EnumDrawOp::Text { text, color, .. } if text == "-15.2%" && *color == theme.palette.danger)
        }));
        assert_content_within_bounds(&document);
    }

    #[test]
    fn fixed_primitive_refuses_to_draw_past_bottom() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let mut canvas = DocumentCanvas::new(&theme, options, "Test", Utc::now());
        let n_y = options.geometry.bottom_bound() - 20.0;
        let err = canvas
            .add_stat_cards(
                &[SpecStatCard {
                    label: "Users".to_string(),
                    value: "10".to_string(),
                    trend: None,
                }],
                n_y,
            )
            .unwrap_err();
        assert!(matches!(err, ReportError::Overflow { .. }));
        assert!(canvas.pages()[0].ops.is_empty());
    }

    fn build_stat_cards(n_cards: usize) -> Vec<SpecStatCard> {
        (0..n_cards)
            .map(|n_idx| SpecStatCard {
                label: format!("Metric {n_idx}"),
                value: n_idx.to_string(),
                trend: None,
            })
            .collect()
    }

    fn collect_rects(ops: &[EnumDrawOp]) -> Vec<(f32, f32, f32, f32)> {
        ops.iter()
            .filter_map(|op| match op {
                EnumDrawOp::Rect {
                    x, y, width, height, ..
                } => Some((*x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn stat_cards_split_content_width_evenly() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let geometry = options.geometry;
        let mut canvas = DocumentCanvas::new(&theme, options, "Test", Utc::now());
        let n_y = geometry.margin_top;
        canvas.add_stat_cards(&build_stat_cards(3), n_y).unwrap();

        let l_rects = collect_rects(&canvas.pages()[0].ops);
        assert_eq!(l_rects.len(), 3);
        let n_width = (geometry.content_width() - 2.0 * options.gutter_card) / 3.0;
        for (n_idx, (n_x, n_top, n_w, n_h)) in l_rects.iter().enumerate() {
            assert!((n_w - n_width).abs() < 1e-3);
            assert!((n_h - options.height_card).abs() < 1e-3);
            assert!((n_top - n_y).abs() < 1e-3);
            let n_x_expected = geometry.margin_left + n_idx as f32 * (n_width + options.gutter_card);
            assert!((n_x - n_x_expected).abs() < 1e-3);
        }
        let (n_x_first, ..) = l_rects[0];
        let (n_x_last, _, n_w_last, _) = l_rects[2];
        assert!((n_x_first - geometry.margin_left).abs() < 1e-3);
        assert!((n_x_last + n_w_last - geometry.right_bound()).abs() < 1e-3);
    }

    #[test]
    fn stat_card_row_narrower_than_minimum_is_rejected() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let l_cards = build_stat_cards(50);
        let report = build_report(vec![("Highlights", EnumSectionKind::StatCards(l_cards.clone()))]);

        let err = layout_document(&report, &theme, &options).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Overflow { ref section, needed, available }
                if section == "stat_cards" && needed > available
        ));

        let mut canvas = DocumentCanvas::new(&theme, options, "Test", Utc::now());
        assert!(canvas.add_stat_cards(&l_cards, options.geometry.margin_top).is_err());
        assert!(canvas.pages()[0].ops.is_empty());

        let n_fit = ((options.geometry.content_width() + options.gutter_card)
            / (options.width_card_min + options.gutter_card)) as usize;
        let mut canvas = DocumentCanvas::new(&theme, options, "Test", Utc::now());
        canvas
            .add_stat_cards(&build_stat_cards(n_fit), options.geometry.margin_top)
            .unwrap();
        for (_, _, n_w, _) in collect_rects(&canvas.pages()[0].ops) {
            assert!(n_w >= options.width_card_min);
        }
    }

    #[test]
    fn bar_heights_scale_with_value() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let mut canvas = DocumentCanvas::new(&theme, options, "Test", Utc::now());
        let n_y = options.geometry.margin_top;
        let l_values = [100.0, 50.0, 25.0];
        let l_points: Vec<SpecBarPoint> = l_values
            .iter()
            .enumerate()
            .map(|(n_idx, value)| SpecBarPoint {
                label: format!("M{}", n_idx + 1),
                value: *value,
            })
            .collect();
        canvas.add_bar_series(&l_points, n_y).unwrap();

        let n_bar_max = options.height_chart - 30.0;
        let n_base_y = n_y + 14.0 + n_bar_max;
        let l_rects = collect_rects(&canvas.pages()[0].ops);
        assert_eq!(l_rects.len(), l_values.len());
        for ((_, n_top, n_w, n_h), value) in l_rects.iter().zip(l_values) {
            assert!((n_h - value as f32 / 100.0 * n_bar_max).abs() < 1e-3);
            assert!((n_top + n_h - n_base_y).abs() < 1e-3);
            assert!(*n_w <= options.width_bar_max + 1e-3);
        }
        assert!(canvas.pages()[0].ops.iter().any(|op| {
            matches!(op, EnumDrawOp::Rect { fill: Some(fill), .. }
                if *fill == color_for_threshold(Some(25.0), &theme.rule_retention).foreground)
        }));
    }

    #[test]
    fn long_header_texts_stay_left_of_the_date() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let geometry = options.geometry;
        let mut canvas = DocumentCanvas::new(&theme, options, "Test", Utc::now());
        let c_title = "Quarterly Cohort Retention and Revenue Breakdown ".repeat(3);
        let c_subtitle = "Monthly retention by join cohort across every region and plan ".repeat(4);
        canvas.add_header(&c_title, Some(&c_subtitle)).unwrap();

        let l_texts: Vec<(f32, f32, f32, bool, &str)> = canvas.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                EnumDrawOp::Text {
                    x, y, size, bold, text, ..
                } => Some((*x, *y, *size, *bold, text.as_str())),
                _ => None,
            })
            .collect();
        for (n_x, _, n_size, if_bold, c_text) in &l_texts {
            let n_end = n_x + estimate_text_width(c_text, *n_size, *if_bold);
            assert!(n_end <= geometry.right_bound() + 1e-3, "{c_text:?} ends at {n_end}");
        }

        let (n_date_x, ..) = l_texts
            .iter()
            .find(|(.., c_text)| c_text.starts_with("Generated "))
            .copied()
            .unwrap();
        let (n_sub_x, _, n_sub_size, _, c_sub) = l_texts
            .iter()
            .find(|(_, _, n_size, ..)| *n_size == options.font_size_subtitle)
            .copied()
            .unwrap();
        assert!(c_sub.ends_with("..."));
        assert!(n_sub_x + estimate_text_width(c_sub, n_sub_size, false) <= n_date_x);
    }

    #[test]
    fn section_taller_than_a_page_is_an_overflow_error() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let rule = SpecColorRule {
            buckets: (0..60)
                .map(|n_idx| SpecColorBucket {
                    bound_lower: (59 - n_idx) as f64,
                    label: format!("Tier {n_idx} with a deliberately long descriptive label text"),
                    colors: SpecColorPair {
                        foreground: SpecColor(n_idx),
                        background: SpecColor(0x010000 + n_idx),
                    },
                })
                .collect(),
            undefined: theme.rule_retention.undefined,
            label_undefined: "No data".to_string(),
        };
        let report = build_report(vec![("Tiers", EnumSectionKind::Legend(EnumLegendSource::Custom(rule)))]);

        let err = layout_document(&report, &theme, &options).unwrap_err();
        assert!(matches!(err, ReportError::Overflow { ref section, .. } if section == "Tiers"));
    }

    #[test]
    fn header_is_drawn_once() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let mut canvas = DocumentCanvas::new(&theme, options, "Test", Utc::now());
        let n_y = canvas.add_header("Test", None).unwrap();
        assert!((n_y - (options.geometry.margin_top + options.height_header_block)).abs() < 1e-3);
        assert!(canvas.add_header("Test", None).is_err());
        assert!(canvas.add_footer(3, 1).is_err());
    }

    #[test]
    fn invalid_input_yields_no_document() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let report = build_report(vec![]);
        assert!(matches!(
            render_document(&report, &theme, &options),
            Err(ReportError::InvalidInput { .. })
        ));
    }

    #[test]
    fn renders_pdf_bytes() {
        let theme = derive_default_theme();
        let options = derive_default_document_options();
        let report = build_report(vec![
            ("Cohort Retention", EnumSectionKind::Matrix(build_cohort_matrix())),
            (
                "Retention by Month",
                EnumSectionKind::BarSeries(vec![
                    SpecBarPoint {
                        label: "M1".to_string(),
                        value: 61.0,
                    },
                    SpecBarPoint {
                        label: "M2".to_string(),
                        value: 47.5,
                    },
                ]),
            ),
        ]);
        let l_bytes = render_document(&report, &theme, &options).unwrap();
        assert!(l_bytes.starts_with(b"%PDF"));
    }
}
