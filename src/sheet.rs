use std::fmt;
use std::path::Path;

use crate::error::{ReportError, Result};

// ---------------------------------------------------------------------------
// Cells, rows, tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) | Cell::Date(s) => f.write_str(s),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(true) => f.write_str("TRUE"),
            Cell::Bool(false) => f.write_str("FALSE"),
        }
    }
}

/// One data row. `line` is the 1-based row number in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub line: usize,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ReportError::MissingColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }
}

/// Name header cells, filling blanks and disambiguating repeats.
fn column_names(raw: Vec<String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let name = name.trim();
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while names.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        names.push(candidate);
    }
    names
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read the first row as column names and every non-blank row after it.
/// `sheet` selects a worksheet in a workbook; it is ignored for CSV.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => load_csv(path),
        #[cfg(feature = "xlsx")]
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, sheet),
        _ => {
            let _ = sheet;
            Err(ReportError::UnsupportedFormat(format!(
                "{} (expected .csv{})",
                path.display(),
                if cfg!(feature = "xlsx") {
                    ", .xlsx, .xlsm, .xlsb, .xls or .ods"
                } else {
                    ""
                }
            )))
        }
    }
}

fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let columns = column_names(rdr.headers()?.iter().map(str::to_string).collect());
    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);
        let cells: Vec<Cell> = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(Row { line, cells });
    }
    Ok(Table { columns, rows })
}

#[cfg(feature = "xlsx")]
fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<Table> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)?;
    let name = match sheet {
        Some(s) => s.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ReportError::NoWorksheet(path.display().to_string()))?,
    };
    let range = workbook.worksheet_range(&name)?;
    Ok(table_from_range(&range))
}

/// The first row of `range` is the header. Line numbers follow the sheet's
/// own row numbering, so a range starting below row 1 keeps its offset.
#[cfg(feature = "xlsx")]
fn table_from_range(range: &calamine::Range<calamine::Data>) -> Table {
    let first_line = range.start().map(|(r, _)| r as usize + 1).unwrap_or(1);

    let mut iter = range.rows();
    let Some(header) = iter.next() else {
        return Table::default();
    };
    let columns = column_names(header.iter().map(|c| from_data(c).to_string()).collect());

    let mut rows = Vec::new();
    for (i, raw) in iter.enumerate() {
        let cells: Vec<Cell> = raw.iter().map(from_data).collect();
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(Row {
            line: first_line + i + 1,
            cells,
        });
    }
    Table { columns, rows }
}

/// Days between the 1900 and 1904 date systems.
#[cfg(feature = "xlsx")]
const EPOCH_1904_OFFSET: f64 = 1462.0;

#[cfg(feature = "xlsx")]
fn from_data(data: &calamine::Data) -> Cell {
    use calamine::Data;

    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => Cell::Text(excel_duration(dt.as_f64())),
        Data::DateTime(dt) => {
            let serial = if dt.is_1904() {
                dt.as_f64() + EPOCH_1904_OFFSET
            } else {
                dt.as_f64()
            };
            Cell::Date(excel_serial_to_datetime(serial))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Date(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
    }
}

/// `[h]:mm:ss`, the way Excel shows elapsed time.
#[cfg(feature = "xlsx")]
fn excel_duration(days: f64) -> String {
    let total = (days * 86_400.0).round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let secs = total.abs();
    format!("{sign}{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Convert an Excel serial date to `YYYY-MM-DD`, adding ` HH:MM:SS` when the
/// serial carries a time of day.
#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_datetime(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let Some(base) = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return serial.to_string();
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    let dt = base + chrono::Duration::milliseconds(millis);
    if dt.time() == chrono::NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(1234.5).to_string(), "1234.5");
        assert_eq!(Cell::Text("Chase".into()).to_string(), "Chase");
        assert_eq!(Cell::Empty.to_string(), "");
        assert_eq!(Cell::Bool(true).to_string(), "TRUE");
    }

    #[test]
    fn test_column_names_fill_and_dedupe() {
        let names = column_names(vec![
            "Date".into(),
            "".into(),
            "Amount".into(),
            "Amount".into(),
            " Amount ".into(),
        ]);
        assert_eq!(names, vec!["Date", "Unnamed: 1", "Amount", "Amount.1", "Amount.2"]);
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "txns.csv",
            "Date,Issuing bank,Amount\n\
             2025-01-15,Chase,\"1,234.56\"\n\
             ,,\n\
             2025-01-16,Citi,50.00\n",
        );
        let table = load_table(&path, None).unwrap();
        assert_eq!(table.columns, vec!["Date", "Issuing bank", "Amount"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].cells[2], Cell::Text("1,234.56".into()));
        assert_eq!(table.rows[1].line, 4);
        assert_eq!(table.rows[1].cells[1], Cell::Text("Citi".into()));
    }

    #[test]
    fn test_load_csv_short_rows_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "short.csv", "Bank,Amount\nChase\n");
        let table = load_table(&path, None).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(table.rows[0].get(1).is_none());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "notes.txt", "a,b\n");
        let err = load_table(&path, None).unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_column_index_missing() {
        let table = Table {
            columns: vec!["Date".into(), "Amount".into()],
            rows: vec![],
        };
        assert_eq!(table.column_index("Amount").unwrap(), 1);
        match table.column_index("Issuing bank").unwrap_err() {
            ReportError::MissingColumn { column, available } => {
                assert_eq!(column, "Issuing bank");
                assert_eq!(available, vec!["Date", "Amount"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_excel_serial_to_datetime() {
        assert_eq!(excel_serial_to_datetime(45667.0), "2025-01-10");
        assert_eq!(excel_serial_to_datetime(45667.5), "2025-01-10 12:00:00");
    }

    #[cfg(feature = "xlsx")]
    mod workbook {
        use super::*;
        use calamine::{CellErrorType, Data, ExcelDateTime, ExcelDateTimeType, Range};

        #[test]
        fn test_from_data_variants() {
            assert_eq!(from_data(&Data::Empty), Cell::Empty);
            assert_eq!(from_data(&Data::String("Chase".into())), Cell::Text("Chase".into()));
            assert_eq!(from_data(&Data::Float(12.5)), Cell::Number(12.5));
            assert_eq!(from_data(&Data::Int(7)), Cell::Number(7.0));
            assert_eq!(from_data(&Data::Bool(false)), Cell::Bool(false));
            assert_eq!(
                from_data(&Data::DateTimeIso("2025-01-10T08:30:00".into())),
                Cell::Date("2025-01-10T08:30:00".into())
            );
            assert_eq!(from_data(&Data::Error(CellErrorType::NA)), Cell::Text("#NA".into()));
        }

        #[test]
        fn test_from_data_excel_dates() {
            let date = ExcelDateTime::new(45667.0, ExcelDateTimeType::DateTime, false);
            assert_eq!(from_data(&Data::DateTime(date)), Cell::Date("2025-01-10".into()));

            let stamp = ExcelDateTime::new(45667.5, ExcelDateTimeType::DateTime, false);
            assert_eq!(
                from_data(&Data::DateTime(stamp)),
                Cell::Date("2025-01-10 12:00:00".into())
            );

            // same day in a workbook using the 1904 date system
            let mac = ExcelDateTime::new(45667.0 - 1462.0, ExcelDateTimeType::DateTime, true);
            assert_eq!(from_data(&Data::DateTime(mac)), Cell::Date("2025-01-10".into()));

            let elapsed = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
            assert_eq!(from_data(&Data::DateTime(elapsed)), Cell::Text("36:00:00".into()));
        }

        #[test]
        fn test_table_from_range_keeps_sheet_lines() {
            // header on sheet row 2, blank sheet row 4
            let mut range: Range<Data> = Range::new((1, 0), (4, 2));
            range.set_value((1, 0), Data::String("Date".into()));
            range.set_value((1, 2), Data::String("Amount".into()));
            let date = ExcelDateTime::new(45667.0, ExcelDateTimeType::DateTime, false);
            range.set_value((2, 0), Data::DateTime(date));
            range.set_value((2, 1), Data::String("Chase".into()));
            range.set_value((2, 2), Data::Float(10.5));
            range.set_value((4, 1), Data::String("Citi".into()));
            range.set_value((4, 2), Data::Int(3));

            let table = table_from_range(&range);
            assert_eq!(table.columns, vec!["Date", "Unnamed: 1", "Amount"]);
            assert_eq!(table.rows.len(), 2);
            assert_eq!(table.rows[0].line, 3);
            assert_eq!(table.rows[0].cells[0], Cell::Date("2025-01-10".into()));
            assert_eq!(table.rows[0].cells[0].to_string(), "2025-01-10");
            assert_eq!(table.rows[1].line, 5);
            assert_eq!(table.rows[1].cells[2], Cell::Number(3.0));
        }

        #[test]
        fn test_load_xlsx() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("txns.xlsx");

            let mut book = umya_spreadsheet::new_file();
            let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
            sheet.get_cell_mut((1, 1)).set_value_string("Issuing bank");
            sheet.get_cell_mut((2, 1)).set_value_string("Amount");
            sheet.get_cell_mut((3, 1)).set_value_string("Amount");
            sheet.get_cell_mut((1, 2)).set_value_string("Chase");
            sheet.get_cell_mut((2, 2)).set_value_number(1234.5);
            sheet.get_cell_mut((1, 4)).set_value_string("Citi");
            sheet.get_cell_mut((2, 4)).set_value_string("1,200.00");
            umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

            let table = load_table(&path, None).unwrap();
            assert_eq!(table.columns, vec!["Issuing bank", "Amount", "Amount.1"]);
            assert_eq!(table.rows.len(), 2);
            assert_eq!(table.rows[0].line, 2);
            assert_eq!(table.rows[0].cells[1], Cell::Number(1234.5));
            assert_eq!(table.rows[1].line, 4);
            assert_eq!(table.rows[1].cells[0], Cell::Text("Citi".into()));
            assert_eq!(table.rows[1].cells[1], Cell::Text("1,200.00".into()));
        }

        #[test]
        fn test_load_xlsx_missing_sheet() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("txns.xlsx");
            let book = umya_spreadsheet::new_file();
            umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

            assert!(load_table(&path, Some("Ledger")).is_err());
        }
    }
}
