//! CSV export of result matrices.

use std::io::Write;
use std::path::Path;

use crate::types::{AnnualResults, Quantity};
use crate::ResultsResult;

/// Write one quantity as CSV: an `hour` column, then one column per entity.
/// Undefined values are left empty.
pub fn export_csv<W: Write>(results: &AnnualResults, quantity: Quantity, out: W) -> ResultsResult<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["hour".to_string()];
    header.extend(quantity.columns(&results.manifest));
    writer.write_record(&header)?;

    for record in &results.records {
        let mut row = vec![record.hour.to_string()];
        row.extend(
            quantity
                .row(record)
                .into_iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_csv_path(results: &AnnualResults, quantity: Quantity, path: &Path) -> ResultsResult<()> {
    let file = std::fs::File::create(path)?;
    export_csv(results, quantity, file)
}
