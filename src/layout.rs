use serde::{Deserialize, Serialize};

use crate::fmt;
use crate::paginate::{Page, Totals};

/// Fixed page geometry, in millimetres. Defaults are landscape US Letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub page_width: f32,
    pub page_height: f32,
    pub left_margin: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub column_width: f32,
    pub row_height: f32,
    pub font_size: f32,
    /// Lowers the row count derived from the geometry. Values above what
    /// fits on the page are clamped.
    pub rows_per_page: Option<usize>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            page_width: 279.4,
            page_height: 215.9,
            left_margin: 12.7,
            top_margin: 25.4,
            bottom_margin: 25.4,
            column_width: 38.1,
            row_height: 6.35,
            font_size: 10.0,
            rows_per_page: None,
        }
    }
}

/// Lines on every page that are not data rows: header, column names,
/// page footer, grand total.
const RESERVED_SLOTS: usize = 4;

impl Layout {
    /// Data rows per page. Derived from the geometry alone, so it is the same
    /// for every page of every report.
    pub fn rows_per_page(&self) -> usize {
        let max = self.max_rows_per_page();
        match self.rows_per_page {
            Some(n) if n > max => {
                log::warn!("rows_per_page {n} does not fit the page, using {max}");
                max
            }
            Some(n) => n.max(1),
            None => max,
        }
    }

    /// Most data rows that fit between the margins alongside the reserved
    /// lines.
    pub fn max_rows_per_page(&self) -> usize {
        let usable = f64::from(self.page_height - self.top_margin - self.bottom_margin);
        let row_h = f64::from(self.row_height);
        if usable <= 0.0 || row_h <= 0.0 {
            return 1;
        }
        // f32 geometry rarely divides exactly
        let slots = (usable / row_h + 1e-4).floor() as usize;
        slots.saturating_sub(RESERVED_SLOTS).max(1)
    }

    /// Distance from the top edge of the page to the baseline of `slot`.
    pub fn slot_y(&self, slot: usize) -> f32 {
        self.top_margin + slot as f32 * self.row_height
    }

    pub fn column_x(&self, index: usize) -> f32 {
        self.left_margin + index as f32 * self.column_width
    }
}

// ---------------------------------------------------------------------------
// Drawing instructions
// ---------------------------------------------------------------------------

/// One string placed on a page. `y` is measured from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub bold: bool,
}

/// Fill the `{column}` and `{value}` placeholders of a header template.
/// Substituted text is never scanned again for placeholders.
pub fn header_line(template: &str, column: &str, value: &str) -> String {
    let mut out = String::with_capacity(template.len() + column.len() + value.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{column}") {
            out.push_str(column);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{value}") {
            out.push_str(value);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

pub fn header_ops(layout: &Layout, header: &str, columns: &[String]) -> Vec<TextOp> {
    let mut ops = Vec::with_capacity(columns.len() + 1);
    if !header.is_empty() {
        ops.push(TextOp {
            x: layout.left_margin,
            y: layout.slot_y(0),
            text: header.to_string(),
            bold: true,
        });
    }
    for (i, name) in columns.iter().enumerate() {
        ops.push(TextOp {
            x: layout.column_x(i),
            y: layout.slot_y(1),
            text: name.clone(),
            bold: true,
        });
    }
    ops
}

/// Cells of one data row. Columns never wrap; long text may run into the
/// next column.
pub fn row_ops(layout: &Layout, slot: usize, cells: &[String]) -> Vec<TextOp> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.is_empty())
        .map(|(i, text)| TextOp {
            x: layout.column_x(i),
            y: layout.slot_y(slot),
            text: text.clone(),
            bold: false,
        })
        .collect()
}

pub fn footer_text(page_number: usize, totals: &Totals, with_amounts: bool) -> String {
    if with_amounts {
        format!(
            "Page {page_number}: {}, subtotal {}",
            fmt::rows(totals.count),
            fmt::amount(totals.sum)
        )
    } else {
        format!("Page {page_number}: {}", fmt::rows(totals.count))
    }
}

pub fn grand_total_text(totals: &Totals, with_amounts: bool) -> String {
    if with_amounts {
        format!("Total: {}, {}", fmt::rows(totals.count), fmt::amount(totals.sum))
    } else {
        format!("Total: {}", fmt::rows(totals.count))
    }
}

fn line_op(layout: &Layout, slot: usize, text: String) -> TextOp {
    TextOp {
        x: layout.left_margin,
        y: layout.slot_y(slot),
        text,
        bold: true,
    }
}

/// Everything drawn on one page. `grand_total` is set only for the last page
/// of a report.
pub fn page_ops(
    layout: &Layout,
    header: &str,
    columns: &[String],
    page: &Page,
    grand_total: Option<&Totals>,
    with_amounts: bool,
) -> Vec<TextOp> {
    let mut ops = header_ops(layout, header, columns);
    let first_row_slot = 2;
    for (i, row) in page.rows.iter().enumerate() {
        ops.extend(row_ops(layout, first_row_slot + i, &row.cells));
    }
    let footer_slot = first_row_slot + page.rows.len();
    ops.push(line_op(
        layout,
        footer_slot,
        footer_text(page.number, &page.totals, with_amounts),
    ));
    if let Some(total) = grand_total {
        ops.push(line_op(
            layout,
            footer_slot + 1,
            grand_total_text(total, with_amounts),
        ));
    }
    ops
}
