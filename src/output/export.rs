//! CSV export of broken links

use crate::output::OutputResult;
use crate::state::CrawlRecord;
use crate::url::extract_authority;
use chrono::{DateTime, Local, TimeZone};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

/// Column order of the broken link report
pub const CSV_HEADER: [&str; 4] = ["source_page", "url", "status", "error"];

/// Records whose status is in the broken set, in crawl order
pub fn broken_records(records: &[CrawlRecord]) -> Vec<&CrawlRecord> {
    records.iter().filter(|r| r.is_broken()).collect()
}

/// Writes the broken subset of `records` as UTF-8 CSV with a header row
///
/// Returns the number of data rows written.
pub fn write_broken_csv<W: Write>(records: &[CrawlRecord], writer: W) -> OutputResult<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for record in broken_records(records) {
        let status = record.status.map(|s| s.to_string()).unwrap_or_default();
        writer.write_record([
            record.source_page.as_str(),
            record.url.as_str(),
            status.as_str(),
            record.error.as_str(),
        ])?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

/// Writes the broken link report to `path`, replacing any existing file
pub fn export_broken_csv(records: &[CrawlRecord], path: &Path) -> OutputResult<usize> {
    let file = File::create(path)?;
    let rows = write_broken_csv(records, file)?;
    tracing::info!("Wrote {} broken links to {}", rows, path.display());
    Ok(rows)
}

/// Report file name for a crawl of `start_url` at the current local time
///
/// Format: `broken_links_<netloc>_<YYYYmmdd_HHMMSS>.csv`
pub fn default_csv_filename(start_url: &Url) -> String {
    csv_filename_at(start_url, &Local::now())
}

/// Report file name for a crawl of `start_url` at `timestamp`
///
/// A port separator in the netloc becomes `_` so the name stays portable.
pub fn csv_filename_at<Tz>(start_url: &Url, timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let netloc = extract_authority(start_url)
        .unwrap_or_else(|| "site".to_string())
        .replace(':', "_");
    format!(
        "broken_links_{}_{}.csv",
        netloc,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}
