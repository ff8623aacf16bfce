/// The application state owner
///
/// `Portal` ties the session store, view machine, router and report store
/// together. Every user event becomes one [`Action`] passed to
/// [`Portal::dispatch`], which mutates state, records or replays history,
/// and finishes with a single settle pass: the session guard, the
/// fragment check, the fetch kick-off and the re-projection of the Locker
/// list. The UI only reads the settled result.
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::catalog::ReportStore;
use super::data::{Report, ReportId, ReportSource};
use super::projection::{project, Criteria, SortOrder, StatusFilter};
use super::router::{NavigationObserver, NavigationSurface, PopEvent, Route, Router};
use super::session::SessionStore;
use super::storage::KeyValueStore;
use super::theme::ThemePreference;
use super::view::{Screen, Transition, ViewMachine, ViewState};
use crate::error::Error;

/// Events the portal reacts to
#[derive(Debug, Clone)]
pub enum Action {
    Login(String),
    Logout,
    ShowLocker,
    OpenReport(ReportId),
    Back,
    Forward,
    /// A fragment typed or opened from outside the app
    VisitFragment(String),
    SetQuery(String),
    ClearQuery,
    SetStatusFilter(StatusFilter),
    SetSortOrder(SortOrder),
    /// Show all statuses and drop the query, keeping the sort order
    ClearFilters,
    /// Try the report fetch again after a failure
    RetryFetch,
    ToggleTheme,
    ReportsLoaded(FetchTicket, Vec<Report>),
    ReportsFailed(FetchTicket, String),
}

/// Identifies one deferred report fetch. Completions carrying any other
/// ticket than the outstanding one are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

/// Side effects requested by a dispatch
#[derive(Debug, Default)]
pub struct Outcome {
    /// Start the deferred report fetch and answer with this ticket
    pub fetch: Option<FetchTicket>,
    /// Recoverable failure to show to the user
    pub error: Option<Error>,
}

/// What the Locker list area should show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Listing<'a> {
    Loading,
    /// The last fetch failed; nothing is retried until asked
    Failed,
    Ready(&'a [Report]),
}

pub struct Portal<K, N> {
    session: SessionStore<K>,
    machine: ViewMachine,
    router: Router<N>,
    source: Arc<dyn ReportSource>,
    /// `None` until reports arrive for the current session
    store: Option<ReportStore>,
    pending_fetch: Option<FetchTicket>,
    /// Set by a failed fetch, cleared on the next Locker entry or a retry
    fetch_failed: bool,
    next_ticket: u64,
    visible: Vec<Report>,
    theme: ThemePreference,
}

impl<K: KeyValueStore, N: NavigationSurface> Portal<K, N> {
    /// Cold start: read the persisted session and theme, then derive the
    /// first screen from the surface's current fragment.
    pub fn start(storage: K, surface: N, source: Arc<dyn ReportSource>) -> (Self, Outcome) {
        let theme = ThemePreference::load(&storage).unwrap_or_else(|err| {
            warn!(%err, "could not read theme preference");
            ThemePreference::default()
        });

        let mut portal = Self {
            session: SessionStore::new(storage),
            machine: ViewMachine::default(),
            router: Router::new(surface),
            source,
            store: None,
            pending_fetch: None,
            fetch_failed: false,
            next_ticket: 0,
            visible: Vec::new(),
            theme,
        };

        let mut outcome = Outcome::default();
        let fragment = portal.router.surface().fragment().to_string();
        portal.derive_route(&fragment);
        portal.settle(&mut outcome);
        info!(screen = %portal.screen(), "portal started");
        (portal, outcome)
    }

    /// Apply one action and settle the result.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        let mut outcome = Outcome::default();
        let before = self.machine.screen();

        match action {
            Action::Login(input) => self.login(&input, &mut outcome),
            Action::Logout => self.logout(&mut outcome),
            Action::ShowLocker => {
                let transition = self.machine.go_locker();
                self.record(transition);
            }
            Action::OpenReport(id) => {
                let transition = self
                    .machine
                    .go_details(self.store.as_ref().unwrap_or(&ReportStore::default()), id);
                self.record(transition);
            }
            Action::Back => match self.router.back() {
                Some(event) => self.on_pop(event),
                // deep-linked details with nothing behind them
                None if self.machine.screen() == Screen::Details => {
                    let transition = self.machine.go_locker();
                    self.record(transition);
                }
                None => {}
            },
            Action::Forward => {
                if let Some(event) = self.router.forward() {
                    self.on_pop(event);
                }
            }
            Action::VisitFragment(fragment) => {
                let event = self.router.visit(&fragment);
                self.on_pop(event);
            }
            Action::SetQuery(query) => self.machine.set_query(query),
            Action::ClearQuery => self.machine.set_query(String::new()),
            Action::SetStatusFilter(filter) => self.machine.set_status_filter(filter),
            Action::SetSortOrder(order) => self.machine.set_sort_order(order),
            Action::ClearFilters => {
                self.machine.set_status_filter(StatusFilter::All);
                self.machine.set_query(String::new());
            }
            Action::RetryFetch => self.fetch_failed = false,
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
                if let Err(err) = self.theme.save(self.session.storage_mut()) {
                    warn!(%err, "could not persist theme preference");
                    outcome.error = Some(err);
                }
            }
            Action::ReportsLoaded(ticket, reports) => self.finish_fetch(ticket, reports),
            Action::ReportsFailed(ticket, message) => {
                if self.pending_fetch == Some(ticket) {
                    warn!(%message, "report fetch failed");
                    self.pending_fetch = None;
                    self.fetch_failed = true;
                    outcome.error = Some(Error::Fetch(message));
                }
            }
        }

        if before != Screen::Locker && self.machine.screen() == Screen::Locker {
            self.fetch_failed = false;
        }
        self.settle(&mut outcome);
        outcome
    }

    fn login(&mut self, input: &str, outcome: &mut Outcome) {
        match self.session.login(input) {
            Ok(_) => {}
            Err(Error::EmptyInput) => {
                outcome.error = Some(Error::EmptyInput);
                return;
            }
            Err(err) => {
                // session is live in memory even if it could not be persisted
                warn!(%err, "could not persist session token");
                outcome.error = Some(err);
            }
        }
        let transition = self.machine.go_locker();
        self.record(transition);
    }

    fn logout(&mut self, outcome: &mut Outcome) {
        if let Err(err) = self.session.logout() {
            warn!(%err, "could not clear persisted session token");
            outcome.error = Some(err);
        }
        self.machine.reset_criteria();
        self.store = None;
        self.pending_fetch = None;
        self.fetch_failed = false;
        let transition = self.machine.go_login();
        self.record(transition);
    }

    /// Push a history entry for a user-driven transition that moved
    fn record(&mut self, transition: Transition) {
        if transition == Transition::Moved {
            self.router.push(self.machine.state());
        }
    }

    /// Initial-route logic, shared by cold start and pops without an entry.
    /// Always rewrites the current history slot instead of adding one.
    fn derive_route(&mut self, fragment: &str) {
        if let Err(err) = self.session.restore() {
            warn!(%err, "could not read persisted session");
        }

        if !self.session.is_active() {
            self.machine.go_login();
        } else if let Some(Route::Report(id)) = Route::parse(fragment) {
            self.load_store_now();
            self.machine
                .go_details(self.store.as_ref().unwrap_or(&ReportStore::default()), id);
        } else {
            self.machine.go_locker();
        }

        debug!(fragment, screen = %self.machine.screen(), "derived route");
        self.router.replace(self.machine.state());
    }

    /// Replay a history entry without recording a new one
    fn replay(&mut self, event: PopEvent) {
        let Some(entry) = event.entry else {
            self.derive_route(&event.fragment);
            return;
        };

        if !self.session.is_active() {
            // the guard in `settle` rewrites the slot
            self.machine.go_login();
            return;
        }

        if entry.screen == Screen::Details {
            self.load_store_now();
        }
        self.machine.restore(
            entry.screen,
            entry.selected,
            self.store.as_ref().unwrap_or(&ReportStore::default()),
        );
    }

    /// Resolve report ids before the deferred fetch finishes
    fn load_store_now(&mut self) {
        if self.store.is_some() {
            return;
        }
        match self.source.load() {
            Ok(reports) => {
                debug!(count = reports.len(), "report store loaded synchronously");
                self.store = Some(ReportStore::new(reports));
            }
            Err(err) => warn!(%err, "could not load reports"),
        }
    }

    fn finish_fetch(&mut self, ticket: FetchTicket, reports: Vec<Report>) {
        if self.pending_fetch != Some(ticket) {
            debug!(?ticket, "ignoring stale report fetch");
            return;
        }
        self.pending_fetch = None;

        if self.store.is_none() {
            info!(count = reports.len(), "reports available");
            self.store = Some(ReportStore::new(reports));
        }
        if self.machine.screen() != Screen::Locker {
            debug!(screen = %self.machine.screen(), "reports arrived away from the locker");
        }
    }

    /// One materialization pass. Runs after every dispatch.
    fn settle(&mut self, outcome: &mut Outcome) {
        if !self.session.is_active() && self.machine.screen() != Screen::Login {
            debug!(screen = %self.machine.screen(), "no session, forcing login");
            self.machine.go_login();
        }

        if !self.router.is_in_sync(self.machine.state()) {
            self.router.replace(self.machine.state());
        }

        if self.machine.screen() == Screen::Locker
            && self.store.is_none()
            && self.pending_fetch.is_none()
            && !self.fetch_failed
        {
            let ticket = FetchTicket(self.next_ticket);
            self.next_ticket += 1;
            self.pending_fetch = Some(ticket);
            outcome.fetch = Some(ticket);
            debug!(?ticket, "report fetch started");
        }

        self.visible = match &self.store {
            Some(store) => project(store.all(), self.machine.criteria()),
            None => Vec::new(),
        };
    }

    pub fn state(&self) -> &ViewState {
        self.machine.state()
    }

    pub fn screen(&self) -> Screen {
        self.machine.screen()
    }

    pub fn criteria(&self) -> &Criteria {
        self.machine.criteria()
    }

    pub fn listing(&self) -> Listing<'_> {
        match self.store {
            Some(_) => Listing::Ready(&self.visible),
            None if self.fetch_failed => Listing::Failed,
            None => Listing::Loading,
        }
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.pending_fetch.is_some()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session.current()
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    #[cfg(test)]
    pub fn router(&self) -> &Router<N> {
        &self.router
    }

    #[cfg(test)]
    pub fn storage(&self) -> &K {
        self.session.storage()
    }
}

impl<K: KeyValueStore, N: NavigationSurface> NavigationObserver for Portal<K, N> {
    fn on_pop(&mut self, event: PopEvent) {
        debug!(fragment = %event.fragment, entry = ?event.entry, "history pop");
        self.replay(event);
    }
}
