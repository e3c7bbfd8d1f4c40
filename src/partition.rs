use std::collections::HashMap;

use crate::error::Result;
use crate::sheet::{Cell, Row, Table};

/// Rows sharing one value of the grouping column, in source order.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub key: String,
    pub rows: Vec<&'a Row>,
}

/// Group rows by the display text of `column`. Partitions come out in the
/// order their key first appears, so output is stable across runs.
pub fn partition<'a>(table: &'a Table, column: &str) -> Result<Vec<Partition<'a>>> {
    let idx = table.column_index(column)?;

    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut partitions: Vec<Partition<'a>> = Vec::new();
    for row in &table.rows {
        let key = row.get(idx).map(Cell::to_string).unwrap_or_default();
        let key = key.trim().to_string();
        match slots.get(&key) {
            Some(&slot) => partitions[slot].rows.push(row),
            None => {
                slots.insert(key.clone(), partitions.len());
                partitions.push(Partition {
                    key,
                    rows: vec![row],
                });
            }
        }
    }
    Ok(partitions)
}
