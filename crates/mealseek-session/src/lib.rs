//! Search-result session: keeps the results page consistent with its URL.
//!
//! Four things change independently while a user browses results: the URL
//! query, the committed search criteria, the page number, and whatever fetch
//! is in flight. [`SessionController`] is the only owner of the visible
//! state and reconciles them one event at a time; [`FetchOrchestrator`]
//! tags every request with a monotonically increasing [`FetchToken`] so that
//! only the newest request's outcome is ever applied.

pub mod backend;
pub mod controller;
pub mod detail;
pub mod error;
pub mod navigator;
pub mod orchestrator;
pub mod runner;

pub use backend::SearchBackend;
pub use controller::{MapCenter, PagingMode, Phase, SessionController, SessionState};
pub use detail::fetch_shop_detail;
pub use error::{ErrorKind, PageChangeError};
pub use navigator::{ChannelNavigator, Navigator};
pub use orchestrator::{Accepted, FetchOrchestrator, FetchToken, PageRequest, Settled};
pub use runner::SessionHandle;
