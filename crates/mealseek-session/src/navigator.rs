//! Where the controller writes URL changes.
//!
//! The controller never moves its own page number on a user request. It
//! writes the new query through a [`Navigator`] and waits to observe it like
//! any other URL change, so pagination buttons, "load more" and history
//! navigation all end up on the same path.

use tokio::sync::mpsc;

pub trait Navigator: Send + 'static {
    /// Adds a history entry, as a user-initiated page change does.
    fn push(&mut self, query: &str);

    /// Rewrites the current entry in place (URL canonicalisation).
    fn replace(&mut self, query: &str);
}

/// Navigator that feeds every written query back into the session loop.
///
/// Stands in for a browser history whose change listener notifies the
/// session. Pushes and replacements are delivered alike, in write order.
#[derive(Debug)]
pub struct ChannelNavigator {
    changes: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (changes, rx) = mpsc::unbounded_channel();
        (Self { changes }, rx)
    }

    fn notify(&self, query: &str) {
        if self.changes.send(query.to_owned()).is_err() {
            tracing::debug!(query, "url listener gone; change not delivered");
        }
    }
}

impl Navigator for ChannelNavigator {
    fn push(&mut self, query: &str) {
        self.notify(query);
    }

    fn replace(&mut self, query: &str) {
        self.notify(query);
    }
}
