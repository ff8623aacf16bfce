/// History router
///
/// Keeps the view state machine and a navigation history in step, so that
/// back/forward gestures and typed deep links reproduce the right screen.
///
/// Architecture:
/// - [`Route`]: the canonical address fragment (`login`, `dashboard`, `report-<id>`)
/// - [`HistoryEntry`]: the opaque state stored with each history slot
/// - [`NavigationSurface`]: where entries are pushed and pops come from
/// - [`NavigationObserver`]: who reacts to pops (the portal)
/// - [`SessionHistory`]: the in-memory navigation surface used by the app
use std::fmt;

use tracing::debug;

use super::data::ReportId;
use super::view::{Screen, ViewState};

const REPORT_PREFIX: &str = "report-";

/// Canonical address fragment of a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Report(ReportId),
}

impl Route {
    /// Parse a fragment, with or without its leading `#`.
    /// Returns `None` for anything outside the fragment grammar.
    pub fn parse(fragment: &str) -> Option<Self> {
        let fragment = fragment.trim();
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        match fragment {
            "login" => Some(Self::Login),
            "dashboard" => Some(Self::Dashboard),
            _ => fragment
                .strip_prefix(REPORT_PREFIX)
                .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse::<ReportId>().ok())
                .filter(|id| *id > 0)
                .map(Self::Report),
        }
    }

    pub fn of(state: &ViewState) -> Self {
        HistoryEntry::of(state).route()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("login"),
            Self::Dashboard => f.write_str("dashboard"),
            Self::Report(id) => write!(f, "{REPORT_PREFIX}{id}"),
        }
    }
}

/// State recorded with a history slot.
///
/// Carries a report id rather than the report itself, so replaying it only
/// needs the report store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryEntry {
    pub screen: Screen,
    pub selected: Option<ReportId>,
}

impl HistoryEntry {
    pub fn of(state: &ViewState) -> Self {
        Self {
            screen: state.screen(),
            selected: state.selected(),
        }
    }

    pub fn route(&self) -> Route {
        match (self.screen, self.selected) {
            (Screen::Login, _) => Route::Login,
            (Screen::Details, Some(id)) => Route::Report(id),
            (Screen::Locker, _) | (Screen::Details, None) => Route::Dashboard,
        }
    }
}

/// Delivered when the user moves through history.
/// `entry` is `None` for slots that were not pushed by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopEvent {
    pub entry: Option<HistoryEntry>,
    pub fragment: String,
}

/// A reversible navigation stack with an address fragment
pub trait NavigationSurface {
    /// Add a slot after the current one, discarding any forward slots
    fn push(&mut self, entry: HistoryEntry, fragment: &str);
    /// Overwrite the current slot
    fn replace(&mut self, entry: HistoryEntry, fragment: &str);
    /// Fragment of the current slot
    fn fragment(&self) -> &str;
    fn back(&mut self) -> Option<PopEvent>;
    fn forward(&mut self) -> Option<PopEvent>;
    /// Navigate to a typed fragment. The new slot carries no entry.
    fn visit(&mut self, fragment: &str) -> PopEvent;
}

/// Reacts to pop events coming from a [`NavigationSurface`]
pub trait NavigationObserver {
    fn on_pop(&mut self, event: PopEvent);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    entry: Option<HistoryEntry>,
    fragment: String,
}

/// In-memory navigation history, one slot per visited address
#[derive(Debug, Clone)]
pub struct SessionHistory {
    slots: Vec<Slot>,
    cursor: usize,
}

impl SessionHistory {
    /// Start with a single stateless slot, as on a fresh page load
    pub fn new(initial_fragment: &str) -> Self {
        Self {
            slots: vec![Slot {
                entry: None,
                fragment: normalize(initial_fragment),
            }],
            cursor: 0,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.slots.len()
    }

    #[cfg(test)]
    pub fn current_entry(&self) -> Option<HistoryEntry> {
        self.slots.get(self.cursor).and_then(|slot| slot.entry)
    }

    fn pop_event(&self) -> PopEvent {
        let slot = &self.slots[self.cursor];
        PopEvent {
            entry: slot.entry,
            fragment: slot.fragment.clone(),
        }
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl NavigationSurface for SessionHistory {
    fn push(&mut self, entry: HistoryEntry, fragment: &str) {
        self.slots.truncate(self.cursor + 1);
        self.slots.push(Slot {
            entry: Some(entry),
            fragment: normalize(fragment),
        });
        self.cursor = self.slots.len() - 1;
    }

    fn replace(&mut self, entry: HistoryEntry, fragment: &str) {
        self.slots[self.cursor] = Slot {
            entry: Some(entry),
            fragment: normalize(fragment),
        };
    }

    fn fragment(&self) -> &str {
        &self.slots[self.cursor].fragment
    }

    fn back(&mut self) -> Option<PopEvent> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.pop_event())
    }

    fn forward(&mut self) -> Option<PopEvent> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.pop_event())
    }

    fn visit(&mut self, fragment: &str) -> PopEvent {
        self.slots.truncate(self.cursor + 1);
        self.slots.push(Slot {
            entry: None,
            fragment: normalize(fragment),
        });
        self.cursor = self.slots.len() - 1;
        self.pop_event()
    }
}

fn normalize(fragment: &str) -> String {
    let fragment = fragment.trim();
    fragment.strip_prefix('#').unwrap_or(fragment).to_string()
}

/// Records view transitions on a navigation surface.
#[derive(Debug)]
pub struct Router<N> {
    surface: N,
}

impl<N: NavigationSurface> Router<N> {
    pub fn new(surface: N) -> Self {
        Self { surface }
    }

    /// Record a user-driven transition as a new history slot
    pub fn push(&mut self, state: &ViewState) {
        let entry = HistoryEntry::of(state);
        let route = entry.route();
        debug!(%route, "history push");
        self.surface.push(entry, &route.to_string());
    }

    /// Rewrite the current slot so it describes `state`
    pub fn replace(&mut self, state: &ViewState) {
        let entry = HistoryEntry::of(state);
        let route = entry.route();
        debug!(%route, "history replace");
        self.surface.replace(entry, &route.to_string());
    }

    /// Route encoded in the surface's current fragment, if it is well-formed
    pub fn current_route(&self) -> Option<Route> {
        Route::parse(self.surface.fragment())
    }

    /// Whether the address fragment describes `state`
    pub fn is_in_sync(&self, state: &ViewState) -> bool {
        self.current_route() == Some(Route::of(state))
    }

    pub fn back(&mut self) -> Option<PopEvent> {
        self.surface.back()
    }

    pub fn forward(&mut self) -> Option<PopEvent> {
        self.surface.forward()
    }

    pub fn visit(&mut self, fragment: &str) -> PopEvent {
        self.surface.visit(fragment)
    }

    pub fn surface(&self) -> &N {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures::mock_reports;
    use crate::state::projection::Criteria;

    #[test]
    fn test_route_grammar() {
        assert_eq!(Route::parse("login"), Some(Route::Login));
        assert_eq!(Route::parse("#dashboard"), Some(Route::Dashboard));
        assert_eq!(Route::parse("#report-104"), Some(Route::Report(104)));
        assert_eq!(Route::parse("report-"), None);
        assert_eq!(Route::parse("report-0"), None);
        assert_eq!(Route::parse("report--3"), None);
        assert_eq!(Route::parse("report-12x"), None);
        assert_eq!(Route::parse("reports"), None);
        assert_eq!(Route::parse(""), None);
    }

    #[test]
    fn test_route_display_round_trips() {
        for route in [Route::Login, Route::Dashboard, Route::Report(112)] {
            assert_eq!(Route::parse(&route.to_string()), Some(route));
        }
    }

    #[test]
    fn test_route_of_view_state() {
        let report = mock_reports().remove(3);
        assert_eq!(Route::of(&ViewState::Login), Route::Login);
        assert_eq!(Route::of(&ViewState::Locker(Criteria::default())), Route::Dashboard);
        assert_eq!(Route::of(&ViewState::Details(report)), Route::Report(104));
    }

    #[test]
    fn test_push_discards_forward_slots() {
        let mut history = SessionHistory::new("#login");
        let locker = HistoryEntry { screen: Screen::Locker, selected: None };
        let details = HistoryEntry { screen: Screen::Details, selected: Some(101) };

        history.push(locker, "dashboard");
        history.push(details, "report-101");
        assert_eq!(history.len(), 3);

        let pop = history.back().unwrap();
        assert_eq!(pop.entry, Some(locker));
        assert_eq!(pop.fragment, "dashboard");
        assert!(history.can_go_forward());

        history.push(details, "report-101");
        assert_eq!(history.len(), 3);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_first_slot_has_no_entry() {
        let mut history = SessionHistory::new("#report-104");
        history.push(HistoryEntry { screen: Screen::Locker, selected: None }, "dashboard");

        let pop = history.back().unwrap();
        assert_eq!(pop.entry, None);
        assert_eq!(pop.fragment, "report-104");
        assert!(history.back().is_none());
    }

    #[test]
    fn test_forward_replays_pushed_entry() {
        let mut history = SessionHistory::default();
        let details = HistoryEntry { screen: Screen::Details, selected: Some(110) };
        history.push(details, "report-110");
        history.back();

        let pop = history.forward().unwrap();
        assert_eq!(pop.entry, Some(details));
        assert!(history.forward().is_none());
    }

    #[test]
    fn test_visit_pushes_stateless_slot() {
        let mut history = SessionHistory::default();
        let pop = history.visit("#report-102");
        assert_eq!(pop.entry, None);
        assert_eq!(pop.fragment, "report-102");
        assert_eq!(history.fragment(), "report-102");
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn test_router_replace_keeps_length() {
        let mut router = Router::new(SessionHistory::new("#report-999"));
        router.replace(&ViewState::Locker(Criteria::default()));
        assert_eq!(router.surface().len(), 1);
        assert_eq!(router.surface().fragment(), "dashboard");
        assert!(router.is_in_sync(&ViewState::Locker(Criteria::default())));
        assert!(!router.is_in_sync(&ViewState::Login));
    }
}
