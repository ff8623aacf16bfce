use super::data::{Report, ReportId};
use crate::error::{Error, Result};

/// Read-only collection of the reports available in a session.
///
/// Populated once from the data collaborator and never mutated; `all`
/// keeps the order the source delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportStore {
    reports: Vec<Report>,
}

impl ReportStore {
    pub fn new(reports: Vec<Report>) -> Self {
        Self { reports }
    }

    pub fn all(&self) -> &[Report] {
        &self.reports
    }

    pub fn by_id(&self, id: ReportId) -> Result<&Report> {
        self.reports
            .iter()
            .find(|report| report.id == id)
            .ok_or(Error::NotFound(id))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
