use std::path::PathBuf;
use std::sync::Arc;

use iced::keyboard::{self, key::Named, Key, Modifiers};
use iced::widget::{column, text_input};
use iced::{task, Element, Subscription, Task, Theme};
use tracing::{info, warn};

mod config;
mod download;
mod error;
mod logging;
mod state;
mod ui;

use config::AppConfig;
use error::Error;
use logging::LogConfig;
use state::data::{fetch_reports, JsonFileReports, MockReports, Report, ReportId, ReportSource};
use state::portal::{Action, FetchTicket, Outcome, Portal};
use state::projection::{SortOrder, StatusFilter};
use state::router::SessionHistory;
use state::storage::{AnyStore, MemoryStore, SqliteStore};
use state::theme::ThemePreference;
use state::view::{Screen, ViewState};

/// A toast currently on screen
#[derive(Debug, Clone)]
struct Toast {
    message: String,
    /// Matches the dismiss timer that belongs to this toast
    generation: u64,
}

/// Main application state
struct ReportLocker {
    portal: Portal<AnyStore, SessionHistory>,
    config: AppConfig,
    source: Arc<dyn ReportSource>,
    /// Text in the patient ID field
    login_input: String,
    /// Inline error under the patient ID field
    login_error: Option<String>,
    toast: Option<Toast>,
    toast_generation: u64,
    /// Aborts the outstanding report fetch
    fetch_handle: Option<task::Handle>,
}

/// Keyboard shortcuts, resolved against the current screen in `update`
#[derive(Debug, Clone, Copy)]
enum Shortcut {
    FocusSearch,
    Escape,
    Back,
    Forward,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    LoginInputChanged(String),
    LoginSubmitted,
    Logout,
    ShowLocker,
    OpenReport(ReportId),
    Back,
    SearchChanged(String),
    ClearSearch,
    FilterSelected(StatusFilter),
    SortSelected(SortOrder),
    ClearFilters,
    RetryFetch,
    ToggleTheme,
    /// Deferred fetch finished (or failed)
    ReportsFetched(FetchTicket, Result<Vec<Report>, String>),
    Download(String),
    DownloadComplete(Result<PathBuf, String>),
    Shortcut(Shortcut),
    DismissToast(u64),
}

impl ReportLocker {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let storage = match SqliteStore::open(&config.db_path()) {
            Ok(store) => AnyStore::Sqlite(store),
            Err(err) => {
                warn!(%err, "could not open key-value store, session will not be remembered");
                AnyStore::Memory(MemoryStore::default())
            }
        };

        let source: Arc<dyn ReportSource> = match &config.reports_file {
            Some(path) => Arc::new(JsonFileReports::new(path.clone())),
            None => Arc::new(MockReports),
        };

        let history = SessionHistory::new(&config.initial_fragment);
        let (portal, outcome) = Portal::start(storage, history, Arc::clone(&source));

        let mut app = ReportLocker {
            portal,
            config,
            source,
            login_input: String::new(),
            login_error: None,
            toast: None,
            toast_generation: 0,
            fetch_handle: None,
        };
        let task = app.follow_up(outcome);
        let focus = app.focus_for_screen();
        (app, Task::batch([task, focus]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoginInputChanged(value) => {
                self.login_input = value;
                self.login_error = None;
                Task::none()
            }
            Message::LoginSubmitted => {
                let input = self.login_input.clone();
                self.apply(Action::Login(input))
            }
            Message::Logout => {
                if let Some(handle) = self.fetch_handle.take() {
                    handle.abort();
                }
                self.apply(Action::Logout)
            }
            Message::ShowLocker => self.apply(Action::ShowLocker),
            Message::OpenReport(id) => self.apply(Action::OpenReport(id)),
            Message::Back => self.apply(Action::Back),
            Message::SearchChanged(query) => self.apply(Action::SetQuery(query)),
            Message::ClearSearch => {
                let task = self.apply(Action::ClearQuery);
                Task::batch([task, text_input::focus(ui::locker::search_input_id())])
            }
            Message::FilterSelected(filter) => self.apply(Action::SetStatusFilter(filter)),
            Message::SortSelected(order) => self.apply(Action::SetSortOrder(order)),
            Message::ClearFilters => self.apply(Action::ClearFilters),
            Message::RetryFetch => self.apply(Action::RetryFetch),
            Message::ToggleTheme => self.apply(Action::ToggleTheme),
            Message::ReportsFetched(ticket, result) => {
                self.fetch_handle = None;
                match result {
                    Ok(reports) => self.apply(Action::ReportsLoaded(ticket, reports)),
                    Err(message) => self.apply(Action::ReportsFailed(ticket, message)),
                }
            }
            Message::Download(file) => {
                let Some(destination) = download::pick_destination(&file) else {
                    return Task::none();
                };
                let toast = self.show_toast(format!("Downloading {file}..."));
                let save = Task::perform(download::save_report(destination), |result| {
                    Message::DownloadComplete(result.map_err(|e| e.to_string()))
                });
                Task::batch([toast, save])
            }
            Message::DownloadComplete(Ok(path)) => {
                info!(path = %path.display(), "download complete");
                Task::none()
            }
            Message::DownloadComplete(Err(err)) => {
                warn!(%err, "download failed");
                self.show_toast(format!("Download failed: {err}"))
            }
            Message::Shortcut(shortcut) => self.handle_shortcut(shortcut),
            Message::DismissToast(generation) => {
                if self.toast.as_ref().is_some_and(|t| t.generation == generation) {
                    self.toast = None;
                }
                Task::none()
            }
        }
    }

    /// Dispatch to the portal and turn its outcome into tasks
    fn apply(&mut self, action: Action) -> Task<Message> {
        let before = self.portal.screen();
        let outcome = self.portal.dispatch(action);
        let task = self.follow_up(outcome);

        if self.portal.screen() != before {
            if self.portal.screen() == Screen::Login {
                self.login_input.clear();
            }
            return Task::batch([task, self.focus_for_screen()]);
        }
        task
    }

    fn follow_up(&mut self, outcome: Outcome) -> Task<Message> {
        let mut tasks = Vec::new();

        match outcome.error {
            Some(Error::EmptyInput) => self.login_error = Some(Error::EmptyInput.to_string()),
            Some(err) => tasks.push(self.show_toast(err.to_string())),
            None => self.login_error = None,
        }

        if let Some(ticket) = outcome.fetch {
            tasks.push(self.start_fetch(ticket));
        }

        Task::batch(tasks)
    }

    /// Run the deferred report fetch for `ticket`
    fn start_fetch(&mut self, ticket: FetchTicket) -> Task<Message> {
        let fetch = fetch_reports(Arc::clone(&self.source), self.config.fetch_delay);
        let (task, handle) = Task::perform(fetch, move |result| {
            Message::ReportsFetched(ticket, result.map_err(|e| e.to_string()))
        })
        .abortable();

        if let Some(previous) = self.fetch_handle.replace(handle) {
            previous.abort();
        }
        task
    }

    fn show_toast(&mut self, message: String) -> Task<Message> {
        self.toast_generation += 1;
        let generation = self.toast_generation;
        self.toast = Some(Toast { message, generation });

        let duration = self.config.toast_duration;
        Task::perform(tokio::time::sleep(duration), move |_| {
            Message::DismissToast(generation)
        })
    }

    fn focus_for_screen(&self) -> Task<Message> {
        match self.portal.screen() {
            Screen::Login => text_input::focus(ui::login::login_input_id()),
            _ => Task::none(),
        }
    }

    fn handle_shortcut(&mut self, shortcut: Shortcut) -> Task<Message> {
        match (shortcut, self.portal.screen()) {
            (Shortcut::FocusSearch, Screen::Locker) => {
                text_input::focus(ui::locker::search_input_id())
            }
            (Shortcut::Escape, Screen::Details) => self.apply(Action::Back),
            (Shortcut::Back, _) => self.apply(Action::Back),
            (Shortcut::Forward, _) => self.apply(Action::Forward),
            _ => Task::none(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let theme = self.portal.theme();
        let patient = self.portal.session_token();

        let screen: Element<'_, Message> = match self.portal.state() {
            ViewState::Login => column![
                ui::header(theme, None),
                ui::login::view(&self.login_input, self.login_error.as_deref()),
            ]
            .into(),
            ViewState::Locker(criteria) => column![
                ui::header(theme, patient),
                ui::locker::view(criteria, self.portal.listing()),
            ]
            .into(),
            ViewState::Details(report) => {
                column![ui::header(theme, patient), ui::details::view(report)].into()
            }
        };

        ui::with_toast(screen, self.toast.as_ref().map(|t| t.message.as_str()))
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(shortcut_for_key)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        match self.portal.theme() {
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
        }
    }
}

/// Map key presses not captured by a widget to shortcuts
fn shortcut_for_key(key: Key, modifiers: Modifiers) -> Option<Message> {
    let shortcut = match key.as_ref() {
        Key::Character("/") => Shortcut::FocusSearch,
        Key::Named(Named::Escape) => Shortcut::Escape,
        Key::Named(Named::ArrowLeft) if modifiers.alt() => Shortcut::Back,
        Key::Named(Named::ArrowRight) if modifiers.alt() => Shortcut::Forward,
        _ => return None,
    };
    Some(Message::Shortcut(shortcut))
}

fn main() -> iced::Result {
    let log_level = config::log_level_from(&|key: &str| std::env::var(key).ok());
    logging::init_logging(&LogConfig::default().with_level(log_level));
    let config = AppConfig::from_env();
    info!(data_dir = %config.data_dir.display(), level = %config.log_level, "starting medisetu");

    iced::application("Medisetu Patient Portal", ReportLocker::update, ReportLocker::view)
        .subscription(ReportLocker::subscription)
        .theme(ReportLocker::theme)
        .centered()
        .run_with(move || ReportLocker::new(config))
}
