/// List projection for the Locker screen
///
/// Search, status filter and sort order are independent inputs. The
/// visible list is recomputed in full from the report store whenever any
/// of them changes; the collection is small enough that no incremental
/// bookkeeping is needed.
use std::cmp::Reverse;
use std::fmt;

use chrono::NaiveDate;
use tracing::debug;

use super::data::{Report, ReportStatus};

/// Which report statuses the Locker shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Normal,
    Abnormal,
    Pending,
}

impl StatusFilter {
    /// Filter buttons in display order
    pub const ALL: [StatusFilter; 4] = [Self::All, Self::Normal, Self::Abnormal, Self::Pending];

    pub fn matches(&self, status: ReportStatus) -> bool {
        match self {
            Self::All => true,
            Self::Normal => status == ReportStatus::Normal,
            Self::Abnormal => status == ReportStatus::Abnormal,
            Self::Pending => status == ReportStatus::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Normal => "Normal",
            Self::Abnormal => "Abnormal",
            Self::Pending => "Pending",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Date order of the Locker list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub const ALL: &'static [SortOrder] = &[Self::Newest, Self::Oldest];
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => f.write_str("Newest First"),
            Self::Oldest => f.write_str("Oldest First"),
        }
    }
}

/// The three user inputs that shape the Locker list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Criteria {
    /// Free-text query, matched case-insensitively against title and source
    pub query: String,
    pub status_filter: StatusFilter,
    pub sort_order: SortOrder,
}

impl Criteria {
    #[cfg(test)]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Sort key for a report. Unparseable dates sort as the earliest possible
/// date, so they end up at the "oldest" end of the list.
pub fn sort_date(report: &Report) -> NaiveDate {
    report.parsed_date().unwrap_or(NaiveDate::MIN)
}

/// Compute the visible, ordered subset of `reports`.
///
/// A report passes when its status matches the filter and the query is a
/// substring of its title or its source (case-insensitive). Sorting is
/// stable, so reports with equal dates keep their store order.
pub fn project(reports: &[Report], criteria: &Criteria) -> Vec<Report> {
    let needle = criteria.query.to_lowercase();

    let mut visible: Vec<Report> = reports
        .iter()
        .filter(|report| criteria.status_filter.matches(report.status))
        .filter(|report| {
            needle.is_empty()
                || report.title.to_lowercase().contains(&needle)
                || report.source.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    match criteria.sort_order {
        SortOrder::Newest => visible.sort_by_key(|report| Reverse(sort_date(report))),
        SortOrder::Oldest => visible.sort_by_key(sort_date),
    }

    debug!(
        total = reports.len(),
        visible = visible.len(),
        filter = %criteria.status_filter,
        order = %criteria.sort_order,
        "projected report list"
    );
    visible
}
