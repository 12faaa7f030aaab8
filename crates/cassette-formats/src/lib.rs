pub mod csv_export;
pub mod fasta;
pub mod genbank;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Timestamped export filename: ISO-8601 instant with `:` and `.`
/// replaced by `-` so the name is safe across filesystems.
pub fn export_filename(stem: &str, ext: &str, now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Secs, true)
        .replace([':', '.'], "-");
    format!("{stem}_{stamp}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_filename_stamp() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 14, 30, 5).unwrap();
        assert_eq!(
            export_filename("cassettes", "csv", now),
            "cassettes_2026-08-07T14-30-05Z.csv"
        );
    }
}
