//! Runs a [`SessionController`] on its own task.
//!
//! The task is the single place where session events are applied: URL
//! notifications, settled fetches, and commands from the [`SessionHandle`]
//! are taken one at a time from a `tokio::select!`, so transitions never
//! interleave. The view model is published on a `watch` channel after
//! every event that changed it.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::backend::SearchBackend;
use crate::controller::{PagingMode, SessionController, SessionState};
use crate::error::PageChangeError;
use crate::navigator::ChannelNavigator;
use crate::orchestrator::{FetchToken, Settled};

const COMMAND_BUFFER: usize = 32;

enum Command {
    Navigate {
        query: String,
        done: oneshot::Sender<()>,
    },
    RequestPage {
        page: u32,
        reply: oneshot::Sender<Result<(), PageChangeError>>,
    },
    LoadMore {
        reply: oneshot::Sender<Result<(), PageChangeError>>,
    },
    Retry {
        reply: oneshot::Sender<Option<FetchToken>>,
    },
}

/// A command's answer, held back until the state it produced is published.
enum Reply {
    Done(oneshot::Sender<()>),
    Page(
        oneshot::Sender<Result<(), PageChangeError>>,
        Result<(), PageChangeError>,
    ),
    Retry(oneshot::Sender<Option<FetchToken>>, Option<FetchToken>),
}

impl Reply {
    fn send(self) {
        // A caller that stopped waiting is not an error for the session.
        let delivered = match self {
            Reply::Done(tx) => tx.send(()).is_ok(),
            Reply::Page(tx, result) => tx.send(result).is_ok(),
            Reply::Retry(tx, token) => tx.send(token).is_ok(),
        };
        if !delivered {
            tracing::debug!("session command caller went away before the reply");
        }
    }
}

/// Owning handle to a running session.
///
/// Dropping the handle (or calling [`SessionHandle::shutdown`]) stops the
/// session task. Fetches still in flight finish on their own and are
/// discarded.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Starts a session over `backend` on a new task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<B: SearchBackend>(backend: Arc<B>, mode: PagingMode) -> Self {
        let (navigator, url_rx) = ChannelNavigator::new();
        let (controller, settled_rx) = SessionController::new(backend, navigator, mode);
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state) = watch::channel(controller.state().clone());

        let task = tokio::spawn(run(controller, url_rx, settled_rx, command_rx, state_tx));
        Self {
            commands,
            state,
            task,
        }
    }

    /// Delivers a URL query to the session, as if the user had opened it.
    ///
    /// Returns once the session has reacted; the fetch it triggered may
    /// still be running (see [`Self::wait_idle`]).
    ///
    /// # Errors
    ///
    /// [`PageChangeError::SessionClosed`] if the session task has stopped.
    pub async fn navigate(&self, query: &str) -> Result<(), PageChangeError> {
        let (done, rx) = oneshot::channel();
        self.send(Command::Navigate {
            query: query.to_owned(),
            done,
        })
        .await?;
        rx.await.map_err(|_| PageChangeError::SessionClosed)
    }

    /// Asks for `page`. On success the URL has been rewritten and the page
    /// fetch is under way.
    ///
    /// # Errors
    ///
    /// The refusal reason from [`SessionController::request_page`], or
    /// [`PageChangeError::SessionClosed`].
    pub async fn request_page(&self, page: u32) -> Result<(), PageChangeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RequestPage { page, reply }).await?;
        rx.await.map_err(|_| PageChangeError::SessionClosed)?
    }

    /// Asks for the page after the current one.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request_page`].
    pub async fn load_more(&self) -> Result<(), PageChangeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::LoadMore { reply }).await?;
        rx.await.map_err(|_| PageChangeError::SessionClosed)?
    }

    /// Re-issues the current request. `Ok(None)` when there is nothing to
    /// retry.
    ///
    /// # Errors
    ///
    /// [`PageChangeError::SessionClosed`] if the session task has stopped.
    pub async fn retry(&self) -> Result<Option<FetchToken>, PageChangeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Retry { reply }).await?;
        rx.await.map_err(|_| PageChangeError::SessionClosed)
    }

    /// Snapshot of the current view model.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A receiver that sees every published view model.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Waits until nothing is loading and returns that state.
    ///
    /// # Errors
    ///
    /// [`PageChangeError::SessionClosed`] if the session task stops first.
    pub async fn wait_idle(&self) -> Result<SessionState, PageChangeError> {
        let mut state = self.state.clone();
        let idle = state
            .wait_for(|s| !s.is_loading)
            .await
            .map_err(|_| PageChangeError::SessionClosed)?;
        Ok(idle.clone())
    }

    /// Stops the session task and waits for it to finish.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(err) = task.await {
            tracing::error!(error = %err, "session task ended abnormally");
        }
    }

    async fn send(&self, command: Command) -> Result<(), PageChangeError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PageChangeError::SessionClosed)
    }
}

async fn run<B: SearchBackend>(
    mut controller: SessionController<B, ChannelNavigator>,
    mut url_rx: mpsc::UnboundedReceiver<String>,
    mut settled_rx: mpsc::UnboundedReceiver<Settled>,
    mut commands: mpsc::Receiver<Command>,
    state_tx: watch::Sender<SessionState>,
) {
    tracing::debug!("session started");
    loop {
        let reply = tokio::select! {
            Some(query) = url_rx.recv() => {
                controller.observe_url(&query);
                None
            }
            Some(settled) = settled_rx.recv() => {
                controller.on_settled(settled);
                None
            }
            command = commands.recv() => match command {
                Some(command) => Some(apply(&mut controller, command)),
                None => break,
            },
        };

        // URL writes made while handling this event are observed before
        // anything is published, so a reply never reports a half-applied
        // page change.
        while let Ok(query) = url_rx.try_recv() {
            controller.observe_url(&query);
        }

        state_tx.send_if_modified(|published| {
            if *published == *controller.state() {
                return false;
            }
            published.clone_from(controller.state());
            true
        });

        if let Some(reply) = reply {
            reply.send();
        }
    }
    tracing::debug!("session stopped");
}

fn apply<B: SearchBackend>(
    controller: &mut SessionController<B, ChannelNavigator>,
    command: Command,
) -> Reply {
    match command {
        Command::Navigate { query, done } => {
            controller.observe_url(&query);
            Reply::Done(done)
        }
        Command::RequestPage { page, reply } => {
            let result = controller.request_page(page);
            if let Err(err) = &result {
                tracing::debug!(page, error = %err, "page request refused");
            }
            Reply::Page(reply, result)
        }
        Command::LoadMore { reply } => Reply::Page(reply, controller.load_more()),
        Command::Retry { reply } => Reply::Retry(reply, controller.retry()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use mealseek_client::{ClientError, SearchPage};
    use mealseek_core::{SearchCriteria, Shop};

    use super::*;
    use crate::error::ErrorKind;

    /// Returns `total` numbered shops, paged, or fails for `keyword=broken`.
    struct StaticBackend {
        total: u32,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchBackend for StaticBackend {
        async fn search(
            &self,
            criteria: &SearchCriteria,
            page: u32,
        ) -> Result<SearchPage, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if criteria.keyword.as_deref() == Some("broken") {
                return Err(ClientError::MissingShops {
                    url: "http://backend/hp/search".to_owned(),
                });
            }
            let first = (page - 1) * 10 + 1;
            let last = (first + 9).min(self.total);
            let shops = (first..=last)
                .map(|n| Shop {
                    id: format!("J{n:03}"),
                    name: format!("Shop {n}"),
                    lat: 35.0,
                    lng: 139.0,
                    details: serde_json::Map::new(),
                })
                .collect::<Vec<_>>();
            Ok(SearchPage {
                results_returned: u32::try_from(shops.len()).unwrap(),
                shops,
                total_results: self.total,
                results_start: first,
            })
        }
    }

    fn backend(total: u32) -> Arc<StaticBackend> {
        Arc::new(StaticBackend {
            total,
            calls: AtomicUsize::new(0),
        })
    }

    fn spawn(total: u32, mode: PagingMode) -> SessionHandle {
        SessionHandle::spawn(backend(total), mode)
    }

    #[tokio::test]
    async fn navigate_then_page_forward() {
        let session = spawn(23, PagingMode::Paginated);
        session.navigate("keyword=ramen").await.unwrap();
        let state = session.wait_idle().await.unwrap();
        assert_eq!(state.total_results, 23);
        assert_eq!(state.results.len(), 10);

        session.request_page(3).await.unwrap();
        let state = session.state();
        assert_eq!(state.page, 3, "URL round trip is applied before the reply");

        let state = session.wait_idle().await.unwrap();
        assert_eq!(state.results.len(), 3);
        assert_eq!(state.results[0].id, "J021");
        session.shutdown().await;
    }

    #[tokio::test]
    async fn new_criteria_rewrite_the_url_back_to_page_one() {
        let session = spawn(23, PagingMode::Paginated);
        session.navigate("keyword=ramen").await.unwrap();
        session.wait_idle().await.unwrap();
        session.request_page(2).await.unwrap();
        session.wait_idle().await.unwrap();

        session.navigate("keyword=udon&page=3").await.unwrap();
        let state = session.state();
        assert_eq!(state.page, 1, "rewritten url is observed before the reply");
        assert_eq!(state.criteria.unwrap().keyword.as_deref(), Some("udon"));

        let state = session.wait_idle().await.unwrap();
        assert_eq!(state.page, 1);
        assert_eq!(state.results[0].id, "J001");

        // The rewrite leaves the session on the new search's own query.
        session.request_page(2).await.unwrap();
        let state = session.wait_idle().await.unwrap();
        assert_eq!(state.results[0].id, "J011");
        assert_eq!(state.criteria.unwrap().keyword.as_deref(), Some("udon"));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn renavigating_after_a_failure_fetches_again() {
        let backend = backend(5);
        let session = SessionHandle::spawn(Arc::clone(&backend), PagingMode::Paginated);
        session.navigate("keyword=broken").await.unwrap();
        let state = session.wait_idle().await.unwrap();
        assert!(matches!(state.error, Some(ErrorKind::Network { .. })));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        session.navigate("keyword=broken").await.unwrap();
        let state = session.wait_idle().await.unwrap();
        assert!(matches!(state.error, Some(ErrorKind::Network { .. })));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refused_page_request_is_reported() {
        let session = spawn(5, PagingMode::Paginated);
        session.navigate("keyword=ramen").await.unwrap();
        session.wait_idle().await.unwrap();
        assert_eq!(
            session.request_page(2).await,
            Err(PageChangeError::OutOfRange {
                requested: 2,
                total_pages: 1
            })
        );
        assert_eq!(
            session.load_more().await.unwrap_err(),
            PageChangeError::OutOfRange {
                requested: 2,
                total_pages: 1
            }
        );
    }

    #[tokio::test]
    async fn load_more_appends() {
        let session = spawn(15, PagingMode::Append);
        session.navigate("keyword=ramen").await.unwrap();
        session.wait_idle().await.unwrap();
        session.load_more().await.unwrap();
        let state = session.wait_idle().await.unwrap();
        assert_eq!(state.results.len(), 15);
        assert!(!state.has_more());
    }

    #[tokio::test]
    async fn invalid_url_is_published_without_loading() {
        let session = spawn(5, PagingMode::Paginated);
        session.navigate("page=2").await.unwrap();
        let state = session.wait_idle().await.unwrap();
        assert_eq!(state.error, Some(ErrorKind::Validation));
        assert_eq!(session.retry().await.unwrap(), None);
    }

    #[tokio::test]
    async fn failure_then_retry() {
        let session = spawn(5, PagingMode::Paginated);
        session.navigate("keyword=broken").await.unwrap();
        let state = session.wait_idle().await.unwrap();
        assert!(matches!(state.error, Some(ErrorKind::Network { .. })));

        assert!(session.retry().await.unwrap().is_some());
        let state = session.wait_idle().await.unwrap();
        assert!(state.error.is_some(), "still broken after retry");
    }

    #[tokio::test]
    async fn commands_fail_once_the_task_is_gone() {
        let session = spawn(5, PagingMode::Paginated);
        session.task.abort();
        tokio::task::yield_now().await;
        assert_eq!(
            session.navigate("keyword=ramen").await,
            Err(PageChangeError::SessionClosed)
        );
    }
}
