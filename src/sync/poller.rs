//! Background reconciliation of a local collection with the server's list.
//!
//! A [`Poller`] owns one tokio task that fetches the list, applies it to the
//! store, sleeps, and repeats. Stopping or dropping the poller cancels the
//! timer and any fetch still in flight.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiResult};
use crate::config::PollingConfig;
use crate::models::{ShortUrl, Upload};
use crate::notify::{Notification, Notifier, SESSION_EXPIRED};
use crate::state::{Collection, FetchOutcome, Identified};

use super::Backoff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Populated(usize),
    Empty,
    Error(String),
    /// The backend rejected the key; polling has stopped
    Unauthenticated,
}

impl ListState {
    /// True once the first fetch has resolved one way or another
    pub fn is_settled(&self) -> bool {
        !matches!(self, ListState::Idle | ListState::Loading)
    }
}

/// Anything that can produce the canonical version of a list
#[async_trait]
pub trait ListSource<T>: Send + Sync {
    async fn fetch(&self) -> ApiResult<Vec<T>>;
}

#[async_trait]
impl ListSource<Upload> for ApiClient {
    async fn fetch(&self) -> ApiResult<Vec<Upload>> {
        self.uploads().await
    }
}

#[async_trait]
impl ListSource<ShortUrl> for ApiClient {
    async fn fetch(&self) -> ApiResult<Vec<ShortUrl>> {
        self.urls().await
    }
}

#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Used in log events
    pub name: &'static str,
    pub interval: Duration,
    pub max_backoff: Option<Duration>,
    /// Notification shown when a fetch fails
    pub failure_message: String,
}

impl PollPolicy {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            max_backoff: None,
            failure_message: format!("Failed to fetch {name}"),
        }
    }

    pub fn from_config(name: &'static str, config: &PollingConfig) -> Self {
        Self {
            max_backoff: config.max_backoff(),
            ..Self::new(name, config.interval())
        }
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = Some(max_backoff);
        self
    }
}

pub struct Poller {
    state: watch::Receiver<ListState>,
    shutdown_tx: watch::Sender<bool>,
    refresh: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling `source` into `store`. Must be called inside a tokio runtime
    pub fn spawn<T, S>(
        source: Arc<S>,
        store: Arc<Collection<T>>,
        notifier: Arc<dyn Notifier>,
        policy: PollPolicy,
    ) -> Self
    where
        T: Identified + Clone + Send + Sync + 'static,
        S: ListSource<T> + ?Sized + 'static,
    {
        let (state_tx, state) = watch::channel(ListState::Idle);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let refresh = Arc::new(Notify::new());

        let handle = tokio::spawn(poll_loop(
            source,
            store,
            notifier,
            policy,
            state_tx,
            shutdown_rx,
            Arc::clone(&refresh),
        ));

        Self {
            state,
            shutdown_tx,
            refresh,
            handle: Some(handle),
        }
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.clone()
    }

    /// Fetch now instead of waiting for the next tick
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel the timer and any in-flight fetch, then wait for the task to end
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Poller task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        // The task may already be gone, in which case nobody is listening
        let _ = self.shutdown_tx.send(true);
    }
}

async fn poll_loop<T, S>(
    source: Arc<S>,
    store: Arc<Collection<T>>,
    notifier: Arc<dyn Notifier>,
    policy: PollPolicy,
    state_tx: watch::Sender<ListState>,
    mut shutdown_rx: watch::Receiver<bool>,
    refresh: Arc<Notify>,
) where
    T: Identified + Clone + Send + Sync + 'static,
    S: ListSource<T> + ?Sized + 'static,
{
    let mut backoff = Backoff::new(policy.interval, policy.max_backoff);
    state_tx.send_replace(ListState::Loading);
    debug!(list = policy.name, "Poller started");

    loop {
        let ticket = store.begin_fetch();
        let result = tokio::select! {
            result = source.fetch() => result,
            _ = shutdown_rx.changed() => break,
        };

        match result {
            Ok(items) => {
                backoff.record_success();
                if store.apply_fetch(ticket, items) != FetchOutcome::Applied {
                    debug!(list = policy.name, "Kept local state over stale poll");
                }
                let len = store.len();
                state_tx.send_replace(if len == 0 {
                    ListState::Empty
                } else {
                    ListState::Populated(len)
                });
            }
            Err(e) if e.is_unauthorized() => {
                warn!(list = policy.name, "Polling stopped: {}", e);
                state_tx.send_replace(ListState::Unauthenticated);
                notifier.notify(Notification::error(SESSION_EXPIRED));
                break;
            }
            Err(e) => {
                backoff.record_failure();
                warn!(
                    list = policy.name,
                    failures = backoff.failures(),
                    "Poll failed: {}",
                    e
                );
                state_tx.send_replace(ListState::Error(e.to_string()));
                notifier.notify(Notification::error(policy.failure_message.clone()));
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(backoff.next_delay()) => {}
            _ = refresh.notified() => {
                debug!(list = policy.name, "Refresh requested");
            }
            _ = shutdown_rx.changed() => break,
        }
    }

    info!(list = policy.name, "Poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::notify::ChannelNotifier;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    impl Identified for Item {
        fn identity(&self) -> &str {
            self.0
        }
    }

    /// Replays scripted results, then keeps returning the last list
    struct Scripted {
        results: Mutex<VecDeque<ApiResult<Vec<Item>>>>,
    }

    impl Scripted {
        fn new(results: Vec<ApiResult<Vec<Item>>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
            })
        }
    }

    #[async_trait]
    impl ListSource<Item> for Scripted {
        async fn fetch(&self) -> ApiResult<Vec<Item>> {
            let mut results = self.results.lock().unwrap();
            if results.len() == 1 {
                if let Some(Ok(items)) = results.front() {
                    return Ok(items.clone());
                }
            }
            results.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[tokio::test]
    async fn recovers_after_failure() {
        let source = Scripted::new(vec![
            Err(ApiError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                message: "Bad Gateway".into(),
            }),
            Ok(vec![Item("a")]),
        ]);
        let store: Arc<Collection<Item>> = Arc::new(Collection::new());
        let (notifier, mut notes) = ChannelNotifier::new();
        let poller = Poller::spawn(
            source,
            Arc::clone(&store),
            Arc::new(notifier),
            PollPolicy::new("items", Duration::from_millis(10)),
        );

        let mut state = poller.subscribe();
        state
            .wait_for(|s| *s == ListState::Populated(1))
            .await
            .unwrap();
        assert_eq!(store.snapshot(), vec![Item("a")]);

        let note = notes.recv().await.unwrap();
        assert!(note.is_error());
        assert_eq!(note.message, "Failed to fetch items");

        poller.stop().await;
    }

    #[tokio::test]
    async fn unauthorized_ends_task() {
        let source = Scripted::new(vec![Err(ApiError::Unauthorized)]);
        let store: Arc<Collection<Item>> = Arc::new(Collection::new());
        let (notifier, mut notes) = ChannelNotifier::new();
        let poller = Poller::spawn(
            source,
            store,
            Arc::new(notifier),
            PollPolicy::new("items", Duration::from_millis(10)),
        );

        let mut state = poller.subscribe();
        state
            .wait_for(|s| *s == ListState::Unauthenticated)
            .await
            .unwrap();
        assert_eq!(notes.recv().await.unwrap().message, SESSION_EXPIRED);

        // The task is gone, so the state channel closes
        assert!(state.changed().await.is_err());
        poller.stop().await;
    }
}
