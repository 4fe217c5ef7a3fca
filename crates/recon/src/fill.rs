use crate::model::SourceTable;

/// Carry each entity's last present value forward over missing periods.
///
/// Periods are scanned ascending. Cells before an entity's first present
/// value stay missing; nothing is ever carried backward or across entities.
pub fn forward_fill(table: &SourceTable) -> SourceTable {
    let cells = table.rows().map(|(_, row)| fill_row(row)).collect();
    table.with_cells(cells)
}

/// Forward-fill a single row of cells in period order.
pub fn fill_row(row: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    row.iter()
        .map(|cell| {
            if cell.is_some() {
                last = *cell;
            }
            last
        })
        .collect()
}
