use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::layout::header_line;
use crate::paginate::{paginate, AmountColumn, Totals};
use crate::partition::{partition, Partition};
use crate::pdf::render_report;
use crate::settings::Settings;
use crate::sheet::{load_table, Table};

/// A report that made it to disk.
#[derive(Debug, Clone)]
pub struct Written {
    pub path: PathBuf,
    pub pages: usize,
    pub total: Totals,
}

/// What happened to one partition.
#[derive(Debug)]
pub struct PartitionOutcome {
    pub key: String,
    pub rows: usize,
    pub result: Result<Written>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub outcomes: Vec<PartitionOutcome>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

// ---------------------------------------------------------------------------
// File naming
// ---------------------------------------------------------------------------

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" => "blank".to_string(),
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}

/// `{column}_{key}.pdf` with characters that cannot appear in a file name
/// replaced by `_`.
pub fn report_file_name(column: &str, key: &str) -> String {
    format!("{}_{}.pdf", sanitize(column), sanitize(key))
}

/// Resolve name clashes created by sanitizing: the first partition keeps the
/// plain name, later ones get `-2`, `-3`, ... Names are compared ignoring
/// case, since `Chase.pdf` and `CHASE.pdf` are one file on case-insensitive
/// filesystems.
fn unique_file_name(column: &str, key: &str, used: &mut HashSet<String>) -> String {
    let name = report_file_name(column, key);
    if used.insert(name.to_lowercase()) {
        return name;
    }
    let stem = name.trim_end_matches(".pdf");
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}.pdf");
        if used.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Generate one report per distinct value of the grouping column.
///
/// Fails outright when the input cannot be read, a required column is
/// missing, or the output directory cannot be created; nothing is written in
/// those cases. Once partitioning succeeds every partition is attempted and
/// its result recorded in the summary.
pub fn run(input: &Path, settings: &Settings) -> Result<RunSummary> {
    let table = load_table(input, settings.sheet.as_deref())?;
    log::debug!(
        "{}: {} rows, columns: {}",
        input.display(),
        table.rows.len(),
        table.columns.join(", ")
    );
    run_table(&table, settings)
}

pub fn run_table(table: &Table, settings: &Settings) -> Result<RunSummary> {
    let group_column = settings.group_column_name.as_str();
    table.column_index(group_column)?;
    let amount = if settings.totals {
        Some(AmountColumn {
            index: table.column_index(&settings.amount_column_name)?,
            name: &settings.amount_column_name,
        })
    } else {
        None
    };

    let partitions = partition(table, group_column)?;

    let output_dir = PathBuf::from(&settings.output_dir);
    std::fs::create_dir_all(&output_dir)?;

    let rows_per_page = settings.layout.rows_per_page();
    log::debug!("{} partitions, {rows_per_page} rows per page", partitions.len());

    let mut used = HashSet::new();
    let mut outcomes = Vec::with_capacity(partitions.len());
    for part in &partitions {
        let file_name = unique_file_name(group_column, &part.key, &mut used);
        let path = output_dir.join(file_name);
        let result = write_report(part, table, amount, rows_per_page, settings, &path);
        match &result {
            Ok(w) => log::info!("{}: {} pages -> {}", part.key, w.pages, w.path.display()),
            Err(e) => {
                log::warn!("{group_column}={}: {e}", part.key);
                remove_stale(&path);
            }
        }
        outcomes.push(PartitionOutcome {
            key: part.key.clone(),
            rows: part.rows.len(),
            result,
        });
    }

    Ok(RunSummary {
        output_dir,
        outcomes,
    })
}

/// A report left over from an earlier run must not pass for this run's
/// output once its partition has failed.
fn remove_stale(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::info!("removed stale {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("could not remove stale {}: {e}", path.display()),
    }
}

fn write_report(
    part: &Partition<'_>,
    table: &Table,
    amount: Option<AmountColumn<'_>>,
    rows_per_page: usize,
    settings: &Settings,
    path: &Path,
) -> Result<Written> {
    let report = paginate(part, amount, rows_per_page)?;
    let header = header_line(&settings.header_text, &settings.group_column_name, &part.key);
    let bytes = render_report(
        &report,
        &table.columns,
        &header,
        &settings.layout,
        amount.is_some(),
    )?;

    // Never leave a truncated document under the final name
    let partial = path.with_extension("pdf.part");
    if let Err(e) = std::fs::write(&partial, &bytes).and_then(|_| std::fs::rename(&partial, path)) {
        let _ = std::fs::remove_file(&partial);
        return Err(e.into());
    }

    Ok(Written {
        path: path.to_path_buf(),
        pages: report.pages.len(),
        total: report.total,
    })
}
