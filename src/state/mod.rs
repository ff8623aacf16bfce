/// State management module
///
/// This module holds all application state, independent of the UI:
/// - Report records and the data collaborator (data.rs)
/// - The read-only report store (catalog.rs)
/// - The persistent key-value surface (storage.rs)
/// - Session token handling (session.rs)
/// - Search, filter and sort over the store (projection.rs)
/// - Screen transitions (view.rs)
/// - Navigation history and address fragments (router.rs)
/// - Theme preference (theme.rs)
/// - The state owner tying it together (portal.rs)

pub mod catalog;
pub mod data;
pub mod portal;
pub mod projection;
pub mod router;
pub mod session;
pub mod storage;
pub mod theme;
pub mod view;
