pub mod columns;
pub mod generate;
pub mod init;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tallysheet",
    version,
    about = "Split a transaction spreadsheet into one paginated PDF report per column value."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one PDF report per distinct value of the grouping column.
    Generate(GenerateArgs),
    /// List the column names found in a spreadsheet.
    Columns {
        /// Path to a CSV or spreadsheet file
        file: PathBuf,
        /// Worksheet to read (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Write the default settings file so it can be edited.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to a CSV or spreadsheet file
    pub file: PathBuf,
    /// Column whose values split the rows into reports
    #[arg(long = "group-column")]
    pub group_column: Option<String>,
    /// Column holding the amounts to total
    #[arg(long = "amount-column")]
    pub amount_column: Option<String>,
    /// Directory for the generated PDFs (created if absent)
    #[arg(long = "output-dir")]
    pub output_dir: Option<String>,
    /// Header line template; {column} and {value} are substituted
    #[arg(long)]
    pub header: Option<String>,
    /// Worksheet to read (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Data rows per page, at most what fits the page (default: derived from the page geometry)
    #[arg(long = "rows-per-page")]
    pub rows_per_page: Option<usize>,
    /// Show row counts only; do not parse or total the amount column
    #[arg(long = "no-totals")]
    pub no_totals: bool,
    /// Settings file (default: ~/.config/tallysheet/settings.json)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
