use csv::Writer;
use thiserror::Error;

use crate::core::MonthSnapshot;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV writer I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes the projection table to CSV. The engine already rounded every
/// figure to cents; this only formats, it never re-derives or re-rounds.
pub fn snapshots_to_csv(snapshots: &[MonthSnapshot]) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record([
        "Month",
        "Total Value",
        "Cumulative Contributions",
        "Cumulative Growth",
    ])?;

    for snapshot in snapshots {
        writer.write_record([
            snapshot.month.to_string(),
            format!("{:.2}", snapshot.total_value),
            format!("{:.2}", snapshot.cumulative_contributions),
            format!("{:.2}", snapshot.cumulative_growth),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
