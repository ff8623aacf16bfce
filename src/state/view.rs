/// View state machine
///
/// Tracks which screen is active and which report, if any, is selected.
/// Transitions are total: each one succeeds and says whether the screen
/// actually changed, which the router uses to decide whether a history
/// entry is due.
use std::fmt;

use tracing::{debug, info};

use super::catalog::ReportStore;
use super::data::{Report, ReportId};
use super::projection::{Criteria, SortOrder, StatusFilter};

/// Screen tag without payload, as recorded in history entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Locker,
    Details,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("login"),
            Self::Locker => f.write_str("locker"),
            Self::Details => f.write_str("details"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Login,
    Locker(Criteria),
    Details(Report),
}

impl ViewState {
    pub fn screen(&self) -> Screen {
        match self {
            Self::Login => Screen::Login,
            Self::Locker(_) => Screen::Locker,
            Self::Details(_) => Screen::Details,
        }
    }

    pub fn selected(&self) -> Option<ReportId> {
        match self {
            Self::Details(report) => Some(report.id),
            _ => None,
        }
    }
}

/// Whether a transition changed the screen or the selected report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved,
    Stayed,
}

#[derive(Debug, Clone)]
pub struct ViewMachine {
    state: ViewState,
    /// Locker criteria, kept while Details or Login is shown.
    /// Equal to the payload of `state` whenever `state` is `Locker`.
    criteria: Criteria,
}

impl Default for ViewMachine {
    fn default() -> Self {
        Self {
            state: ViewState::Login,
            criteria: Criteria::default(),
        }
    }
}

impl ViewMachine {
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen()
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    fn enter(&mut self, next: ViewState) -> Transition {
        if next == self.state {
            return Transition::Stayed;
        }
        info!(from = %self.state.screen(), to = %next.screen(), report = ?next.selected(), "view transition");
        self.state = next;
        Transition::Moved
    }

    pub fn go_login(&mut self) -> Transition {
        self.enter(ViewState::Login)
    }

    /// Show the Locker with the criteria carried over from the last visit
    pub fn go_locker(&mut self) -> Transition {
        self.enter(ViewState::Locker(self.criteria.clone()))
    }

    /// Open the details of report `id`.
    ///
    /// An id missing from the store never produces a Details screen: from
    /// the Locker nothing happens, from anywhere else the Locker is shown.
    pub fn go_details(&mut self, store: &ReportStore, id: ReportId) -> Transition {
        match store.by_id(id) {
            Ok(report) => self.enter(ViewState::Details(report.clone())),
            Err(err) => {
                debug!(%err, "details unavailable, falling back to locker");
                self.go_locker()
            }
        }
    }

    /// Rebuild the view from a recorded screen tag and selection.
    /// A Details entry whose report is gone degrades to the Locker.
    pub fn restore(
        &mut self,
        screen: Screen,
        selected: Option<ReportId>,
        store: &ReportStore,
    ) -> Transition {
        debug!(%screen, report = ?selected, "restoring view");
        match (screen, selected) {
            (Screen::Login, _) => self.go_login(),
            (Screen::Locker, _) | (Screen::Details, None) => self.go_locker(),
            (Screen::Details, Some(id)) => self.go_details(store, id),
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.criteria.query = query.into();
        self.sync_criteria();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.criteria.status_filter = filter;
        self.sync_criteria();
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.criteria.sort_order = order;
        self.sync_criteria();
    }

    /// Back to an empty query, all statuses, newest first
    pub fn reset_criteria(&mut self) {
        self.criteria = Criteria::default();
        self.sync_criteria();
    }

    fn sync_criteria(&mut self) {
        if let ViewState::Locker(criteria) = &mut self.state {
            criteria.clone_from(&self.criteria);
        }
    }
}
