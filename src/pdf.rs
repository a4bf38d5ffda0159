use std::io::BufWriter;

use printpdf::*;

use crate::error::{Result, TallyError};
use crate::export::{summary_lines, ReportContext, ReportRow, COLUMNS};
use crate::fmt::money;
use crate::reports::Totals;

// US Letter dimensions (mm)
const PAGE_W: f32 = 215.9;
const PAGE_H: f32 = 279.4;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 25.4;
const MARGIN_LEFT: f32 = 19.05;
const MARGIN_RIGHT: f32 = 19.05;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;
const SUMMARY_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 8.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

/// Cut `text` so it fits in `width`, marking the cut with "..".
fn fit(text: &str, width: f32, size: f32) -> String {
    if approx_text_width(text, size) <= width {
        return text.to_string();
    }
    let max_chars = (width / (size * 0.18)) as usize;
    let kept: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    format!("{kept}..")
}

fn pdf_err(e: impl std::fmt::Debug) -> TallyError {
    TallyError::Pdf(format!("{e:?}"))
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

const TABLE: [Col; 5] = [
    Col { width: 25.0, align: Align::Left },
    Col { width: 24.0, align: Align::Left },
    Col { width: 42.0, align: Align::Left },
    Col { width: 58.0, align: Align::Left },
    Col { width: 28.8, align: Align::Right },
];

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn accent() -> Color {
    Color::Rgb(Rgb::new(0.12, 0.31, 0.55, None))
}

fn positive() -> Color {
    Color::Rgb(Rgb::new(0.1, 0.5, 0.2, None))
}

fn negative() -> Color {
    Color::Rgb(Rgb::new(0.7, 0.1, 0.1, None))
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        Ok(Self {
            doc,
            font,
            font_bold,
            pages: vec![(page, layer)],
            y: MARGIN_TOP,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.pages.len() - 1];
        self.doc.get_page(page).get_layer(layer)
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.pages.push((page, layer));
        self.y = MARGIN_TOP;
    }

    /// Start a new page if `needed` mm would run into the bottom margin.
    /// Returns true when a page break happened.
    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
            return true;
        }
        false
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer().use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn colored_text(&self, s: &str, x: f32, size: f32, bold: bool, color: Color) {
        let layer = self.layer();
        layer.set_fill_color(color);
        let font = if bold { &self.font_bold } else { &self.font };
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
        layer.set_fill_color(black());
    }

    fn hline(&self, x1: f32, x2: f32, thickness: f32) {
        let layer = self.layer();
        layer.set_outline_thickness(thickness);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, ctx: &ReportContext) {
        self.colored_text(&ctx.title, MARGIN_LEFT, TITLE_SIZE, true, accent());
        self.y += 7.0;
        if !ctx.subtitle.is_empty() {
            self.text(&ctx.subtitle, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        let ts = ctx.generated_at.format("Generated %d/%m/%Y %H:%M").to_string();
        self.text(&ts, MARGIN_LEFT, 8.0, false);
        self.y += 5.0;
    }

    /// The three totals set off between two heavy rules.
    fn summary_block(&mut self, totals: &Totals, symbol: &str) {
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT, 1.2);
        self.y += 7.0;
        let value_x = MARGIN_LEFT + 60.0;
        for (label, value) in summary_lines(totals) {
            let amount = money(value, symbol);
            let color = match label {
                "Net Balance" if value.is_sign_negative() && !value.is_zero() => negative(),
                "Net Balance" => positive(),
                _ => accent(),
            };
            self.text(label, MARGIN_LEFT, SUMMARY_SIZE, true);
            let tw = approx_text_width(&amount, SUMMARY_SIZE);
            self.colored_text(&amount, value_x + 40.0 - tw, SUMMARY_SIZE, true, color);
            self.y += 6.5;
        }
        self.y -= 2.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT, 1.2);
        self.y += 8.0;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        self.table_row(cols, headers, true);
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT, 0.5);
        self.y += 4.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if let Some(value) = values.get(i) {
                let value = fit(value, col.width - 2.0, FONT_SIZE);
                match col.align {
                    Align::Left => self.text(&value, x, FONT_SIZE, bold),
                    Align::Right => {
                        let tw = approx_text_width(&value, FONT_SIZE);
                        self.text(&value, x + col.width - tw, FONT_SIZE, bold);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn footer(&self) {
        let total = self.pages.len();
        for (i, (page, layer)) in self.pages.iter().enumerate() {
            let label = format!("Page {} of {}", i + 1, total);
            let x = PAGE_W - MARGIN_RIGHT - approx_text_width(&label, FOOTER_SIZE);
            let layer = self.doc.get_page(*page).get_layer(*layer);
            layer.use_text(label, FOOTER_SIZE, Mm(x), Mm(MARGIN_BOTTOM / 2.0), &self.font);
        }
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        self.footer();
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf).map_err(pdf_err)?;
        buf.into_inner().map_err(|e| TallyError::Pdf(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Render functions
// ---------------------------------------------------------------------------

/// Paginated transaction table under a summary header block.
pub fn render_transactions(rows: &[ReportRow], totals: &Totals, ctx: &ReportContext) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(&ctx.title)?;
    pdf.header(ctx);
    pdf.summary_block(totals, &ctx.currency_symbol);
    pdf.table_header(&TABLE, &COLUMNS);

    if rows.is_empty() {
        pdf.text("No transactions.", MARGIN_LEFT, FONT_SIZE, false);
    }

    for row in rows {
        if pdf.ensure_space(ROW_H) {
            pdf.table_header(&TABLE, &COLUMNS);
        }
        pdf.table_row(&TABLE, &row.fields(), false);
    }

    pdf.to_bytes()
}
