/// Shared data structures for the application state
///
/// These structs represent the report records that flow from the data
/// collaborator into the report store and on to the UI layer.
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Report identifiers are positive integers, unique within a collection
pub type ReportId = u32;

/// Placeholder shown when a report file has no size yet
pub const SIZE_UNAVAILABLE: &str = "—";

/// Bundled report collection, used when no report file is configured
const BUNDLED_REPORTS: &str = include_str!("../../data/reports.json");

/// Outcome of a medical report as recorded by the lab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportStatus {
    Normal,
    Abnormal,
    Pending,
    #[default]
    Unknown,
}

impl ReportStatus {
    /// Parse a status label case-insensitively; anything else is `Unknown`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "normal" => Self::Normal,
            "abnormal" => Self::Abnormal,
            "pending" => Self::Pending,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Abnormal => "Abnormal",
            Self::Pending => "Pending",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Represents a single report in the locker
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawReport")]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    /// Calendar date as an ISO-8601 string (e.g., "2023-10-24")
    pub date: String,
    /// Lab or clinic that issued the report
    pub source: String,
    pub status: ReportStatus,
    /// Filename offered for download (e.g., "cbc_oct24.pdf")
    pub file: String,
    /// Human-readable size, or [`SIZE_UNAVAILABLE`]
    pub size: String,
}

/// A report record as found in the data source. Only the id is required;
/// missing, null or blank fields get a placeholder.
#[derive(Deserialize)]
struct RawReport {
    id: ReportId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    size: Option<String>,
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

impl From<RawReport> for Report {
    fn from(raw: RawReport) -> Self {
        Self {
            id: raw.id,
            title: or_placeholder(raw.title, "Untitled Report"),
            // empty dates display as "N/A"
            date: raw.date.unwrap_or_default(),
            source: or_placeholder(raw.source, "Unknown Lab"),
            status: raw
                .status
                .map(|status| ReportStatus::parse(&status))
                .unwrap_or_default(),
            file: or_placeholder(raw.file, "report.pdf"),
            size: or_placeholder(raw.size, "Unknown size"),
        }
    }
}

impl Report {
    /// Parse the report date.
    ///
    /// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp, of which
    /// only the calendar date is kept.
    pub fn parsed_date(&self) -> Result<NaiveDate> {
        let raw = self.date.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
            .map_err(|_| Error::UnparseableDate(self.date.clone()))
    }

    /// Date formatted for display, e.g. "Oct 24, 2023"
    pub fn display_date(&self) -> String {
        if self.date.trim().is_empty() {
            return "N/A".to_string();
        }
        match self.parsed_date() {
            Ok(date) => date.format("%b %-d, %Y").to_string(),
            Err(_) => "Invalid Date".to_string(),
        }
    }

    pub fn size_available(&self) -> bool {
        let size = self.size.trim();
        !size.is_empty() && size != SIZE_UNAVAILABLE
    }
}

/// Supplies the report collection for a session
pub trait ReportSource: Send + Sync {
    fn load(&self) -> Result<Vec<Report>>;
}

/// The reports bundled with the application
#[derive(Debug, Clone, Copy, Default)]
pub struct MockReports;

impl ReportSource for MockReports {
    fn load(&self) -> Result<Vec<Report>> {
        Ok(serde_json::from_str(BUNDLED_REPORTS)?)
    }
}

/// Reports read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileReports {
    path: PathBuf,
}

impl JsonFileReports {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ReportSource for JsonFileReports {
    fn load(&self) -> Result<Vec<Report>> {
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Fetch the report collection after a simulated network delay.
///
/// Runs on the iced executor; the caller decides whether the result is
/// still wanted when it arrives.
pub async fn fetch_reports(source: Arc<dyn ReportSource>, delay: Duration) -> Result<Vec<Report>> {
    tokio::time::sleep(delay).await;
    source.load()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_reports_load() {
        let reports = fixtures::mock_reports();
        let ids: Vec<ReportId> = reports.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![101, 102, 103, 104, 105, 110, 112]);
        assert_eq!(reports[1].status, ReportStatus::Abnormal);
        assert!(!reports[4].size_available());
    }

    #[test]
    fn test_incomplete_records_get_placeholders() {
        let path = std::env::temp_dir().join(format!("medisetu_reports_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[
                { "id": 1, "title": "CBC", "date": "2023-10-24", "source": "Apollo", "status": "Normal", "file": "cbc.pdf", "size": "1.2 MB" },
                { "id": 2, "title": "Urine Culture", "date": "2023-10-01", "source": null, "file": "" }
            ]"#,
        )
        .unwrap();
        let reports = JsonFileReports::new(path.clone()).load();
        std::fs::remove_file(&path).unwrap();

        let reports = reports.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, ReportStatus::Normal);

        let partial = &reports[1];
        assert_eq!(partial.title, "Urine Culture");
        assert_eq!(partial.status, ReportStatus::Unknown);
        assert_eq!(partial.source, "Unknown Lab");
        assert_eq!(partial.file, "report.pdf");
        assert_eq!(partial.size, "Unknown size");
    }

    #[test]
    fn test_record_with_only_an_id() {
        let reports: Vec<Report> = serde_json::from_str(r#"[{ "id": 7 }]"#).unwrap();
        assert_eq!(reports[0].title, "Untitled Report");
        assert_eq!(reports[0].display_date(), "N/A");
        assert!(serde_json::from_str::<Vec<Report>>(r#"[{ "title": "No id" }]"#).is_err());
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(ReportStatus::parse("ABNORMAL"), ReportStatus::Abnormal);
        assert_eq!(ReportStatus::parse(" pending "), ReportStatus::Pending);
        assert_eq!(ReportStatus::parse("borderline"), ReportStatus::Unknown);
    }

    #[test]
    fn test_parsed_date_formats() {
        let plain = fixtures::report(1, "2023-10-24", ReportStatus::Normal);
        assert_eq!(plain.parsed_date().unwrap(), NaiveDate::from_ymd_opt(2023, 10, 24).unwrap());

        let stamped = fixtures::report(2, "2023-10-24T08:30:00+05:30", ReportStatus::Normal);
        assert_eq!(stamped.parsed_date().unwrap(), NaiveDate::from_ymd_opt(2023, 10, 24).unwrap());

        let broken = fixtures::report(3, "24/10/2023", ReportStatus::Normal);
        assert!(matches!(broken.parsed_date(), Err(Error::UnparseableDate(d)) if d == "24/10/2023"));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(fixtures::report(1, "2023-04-05", ReportStatus::Normal).display_date(), "Apr 5, 2023");
        assert_eq!(fixtures::report(2, "", ReportStatus::Normal).display_date(), "N/A");
        assert_eq!(fixtures::report(3, "soon", ReportStatus::Normal).display_date(), "Invalid Date");
    }

    #[test]
    fn test_fetch_reports_waits_then_loads() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let source: Arc<dyn ReportSource> = Arc::new(MockReports);
        let reports = runtime
            .block_on(fetch_reports(source, Duration::from_millis(5)))
            .unwrap();
        assert_eq!(reports.len(), 7);
    }
}
