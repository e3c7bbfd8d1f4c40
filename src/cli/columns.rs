use std::path::Path;

use crate::error::Result;
use crate::sheet::load_table;

pub fn run(file: &Path, sheet: Option<&str>) -> Result<()> {
    let table = load_table(file, sheet)?;
    println!("Columns in {}:", file.display());
    for (i, name) in table.columns.iter().enumerate() {
        println!("  {:>3}  {name}", i + 1);
    }
    println!("{} data rows", table.rows.len());
    Ok(())
}
