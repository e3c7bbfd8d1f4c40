use crate::amount::cell_amount;
use crate::error::{ReportError, Result};
use crate::fmt;
use crate::partition::Partition;
use crate::sheet::Row;

/// Row count and amount sum over some run of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub count: usize,
    pub sum: f64,
}

impl Totals {
    fn record(&mut self, amount: Option<f64>) {
        self.count += 1;
        if let Some(a) = amount {
            self.sum += a;
        }
    }
}

/// A data row ready to draw: one display string per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRow {
    pub cells: Vec<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based.
    pub number: usize,
    pub rows: Vec<PageRow>,
    /// This page only.
    pub totals: Totals,
    /// Everything up to and including this page.
    pub running: Totals,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub key: String,
    pub pages: Vec<Page>,
    pub total: Totals,
}

/// The column whose cells are parsed and summed.
#[derive(Debug, Clone, Copy)]
pub struct AmountColumn<'c> {
    pub index: usize,
    pub name: &'c str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Paging(usize),
    Sealed,
}

/// Walks a partition in fixed-size windows, yielding one [`Page`] per window.
///
/// Windows are contiguous and cover every row; the last one may be short.
/// Running totals are accumulated row by row, so the final `running` value
/// equals the sum of every parsed amount taken once. The first row that
/// fails to parse seals the paginator: the error is yielded and iteration
/// ends.
pub struct Paginator<'p, 'a> {
    rows: &'p [&'a Row],
    amount: Option<AmountColumn<'p>>,
    rows_per_page: usize,
    cursor: usize,
    running: Totals,
    state: State,
}

impl<'p, 'a> Paginator<'p, 'a> {
    pub fn new(
        partition: &'p Partition<'a>,
        amount: Option<AmountColumn<'p>>,
        rows_per_page: usize,
    ) -> Self {
        Self {
            rows: &partition.rows,
            amount,
            rows_per_page: rows_per_page.max(1),
            cursor: 0,
            running: Totals::default(),
            state: State::Idle,
        }
    }

    pub fn running(&self) -> Totals {
        self.running
    }

    pub fn is_sealed(&self) -> bool {
        self.state == State::Sealed
    }

    fn page_row(&self, row: &Row) -> Result<PageRow> {
        let parsed = match self.amount {
            None => None,
            Some(col) => {
                let cell = match row.get(col.index) {
                    Some(cell) if !cell.is_empty() => cell,
                    _ => {
                        return Err(ReportError::MissingField {
                            line: row.line,
                            column: col.name.to_string(),
                        })
                    }
                };
                let value = cell_amount(cell).map_err(|source| ReportError::Field {
                    line: row.line,
                    column: col.name.to_string(),
                    source,
                })?;
                Some((col.index, value))
            }
        };

        let cells = row
            .cells
            .iter()
            .enumerate()
            .map(|(i, cell)| match parsed {
                Some((idx, value)) if idx == i => fmt::amount(value),
                _ => cell.to_string(),
            })
            .collect();

        Ok(PageRow {
            cells,
            amount: parsed.map(|(_, value)| value),
        })
    }
}

impl Iterator for Paginator<'_, '_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let number = match self.state {
            State::Sealed => return None,
            State::Idle => 1,
            State::Paging(n) => n + 1,
        };
        if self.cursor >= self.rows.len() {
            self.state = State::Sealed;
            return None;
        }

        let end = (self.cursor + self.rows_per_page).min(self.rows.len());
        let window = &self.rows[self.cursor..end];
        let mut totals = Totals::default();
        let mut rows = Vec::with_capacity(window.len());
        for row in window {
            match self.page_row(row) {
                Ok(page_row) => {
                    totals.record(page_row.amount);
                    self.running.record(page_row.amount);
                    rows.push(page_row);
                }
                Err(e) => {
                    self.state = State::Sealed;
                    return Some(Err(e));
                }
            }
        }

        self.cursor = end;
        self.state = State::Paging(number);
        Some(Ok(Page {
            number,
            rows,
            totals,
            running: self.running,
        }))
    }
}

/// Paginate a whole partition. Fails on the first row whose amount is
/// missing or unparseable.
pub fn paginate(
    partition: &Partition<'_>,
    amount: Option<AmountColumn<'_>>,
    rows_per_page: usize,
) -> Result<Report> {
    let mut pager = Paginator::new(partition, amount, rows_per_page);
    let pages = pager.by_ref().collect::<Result<Vec<_>>>()?;
    debug_assert!(pager.is_sealed());
    Ok(Report {
        key: partition.key.clone(),
        pages,
        total: pager.running(),
    })
}
