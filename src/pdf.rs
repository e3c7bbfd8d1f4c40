use std::io::BufWriter;

use printpdf::*;

use crate::error::{ReportError, Result};
use crate::layout::{self, Layout, TextOp};
use crate::paginate::{Page, Report, Totals};

struct PdfWriter<'l> {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    layout: &'l Layout,
}

impl<'l> PdfWriter<'l> {
    fn new(title: &str, layout: &'l Layout) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(layout.page_width),
            Mm(layout.page_height),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            layout,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(self.layout.page_width),
            Mm(self.layout.page_height),
            "Layer 1",
        );
        self.current_page = page;
        self.current_layer = layer;
    }

    fn text(&self, op: &TextOp) {
        let font = if op.bold { &self.font_bold } else { &self.font };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        // printpdf measures y from the bottom edge
        let y = self.layout.page_height - op.y;
        layer.use_text(op.text.as_str(), self.layout.font_size, Mm(op.x), Mm(y), font);
    }

    fn draw(&self, ops: &[TextOp]) {
        for op in ops {
            self.text(op);
        }
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| ReportError::Pdf(e.to_string()))
    }
}

/// Render a paginated report, one physical page per [`Page`]. The last page
/// also carries the report's grand total.
pub fn render_report(
    report: &Report,
    columns: &[String],
    header: &str,
    layout: &Layout,
    with_amounts: bool,
) -> Result<Vec<u8>> {
    let title = if header.is_empty() { report.key.as_str() } else { header };
    let mut pdf = PdfWriter::new(title, layout)?;

    if report.pages.is_empty() {
        let empty = Page {
            number: 1,
            rows: Vec::new(),
            totals: Totals::default(),
            running: Totals::default(),
        };
        pdf.draw(&layout::page_ops(
            layout,
            header,
            columns,
            &empty,
            Some(&report.total),
            with_amounts,
        ));
        return pdf.to_bytes();
    }

    let last = report.pages.len() - 1;
    for (i, page) in report.pages.iter().enumerate() {
        if i > 0 {
            pdf.new_page();
        }
        let grand_total = (i == last).then_some(&page.running);
        pdf.draw(&layout::page_ops(
            layout,
            header,
            columns,
            page,
            grand_total,
            with_amounts,
        ));
    }

    pdf.to_bytes()
}
