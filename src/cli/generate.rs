use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::GenerateArgs;
use crate::driver::{self, RunSummary};
use crate::error::{ReportError, Result};
use crate::fmt;
use crate::settings::{load_settings, Settings};

fn apply_overrides(settings: &mut Settings, args: &GenerateArgs) {
    if let Some(col) = &args.group_column {
        settings.group_column_name = col.clone();
    }
    if let Some(col) = &args.amount_column {
        settings.amount_column_name = col.clone();
    }
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(header) = &args.header {
        settings.header_text = header.clone();
    }
    if args.sheet.is_some() {
        settings.sheet = args.sheet.clone();
    }
    if args.rows_per_page.is_some() {
        settings.layout.rows_per_page = args.rows_per_page;
    }
    if args.no_totals {
        settings.totals = false;
    }
}

fn format_summary(summary: &RunSummary, with_amounts: bool) -> String {
    let mut table = Table::new();
    if with_amounts {
        table.set_header(vec!["Value", "Rows", "Pages", "Total", "Result"]);
    } else {
        table.set_header(vec!["Value", "Rows", "Pages", "Result"]);
    }

    for outcome in &summary.outcomes {
        let (pages, total, result) = match &outcome.result {
            Ok(w) => (
                w.pages.to_string(),
                fmt::amount(w.total.sum),
                w.path.display().to_string().green().to_string(),
            ),
            Err(e) => (String::new(), String::new(), e.to_string().red().to_string()),
        };
        let mut row = vec![
            Cell::new(&outcome.key),
            Cell::new(outcome.rows),
            Cell::new(pages),
        ];
        if with_amounts {
            row.push(Cell::new(total));
        }
        row.push(Cell::new(result));
        table.add_row(row);
    }
    table.to_string()
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    apply_overrides(&mut settings, &args);

    let summary = driver::run(&args.file, &settings)?;
    if summary.outcomes.is_empty() {
        println!("No rows in {}; nothing to do.", args.file.display());
        return Ok(());
    }

    println!("{}", format_summary(&summary, settings.totals));
    let failed = summary.failed();
    let total = summary.outcomes.len();
    if failed > 0 {
        for outcome in summary.outcomes.iter().filter(|o| o.result.is_err()) {
            if let Err(e) = &outcome.result {
                eprintln!("{}={}: {e}", settings.group_column_name, outcome.key);
            }
        }
        return Err(ReportError::PartitionsFailed { failed, total });
    }

    println!(
        "Wrote {} to {}",
        if total == 1 { "1 report".to_string() } else { format!("{total} reports") },
        summary.output_dir.display()
    );
    Ok(())
}
