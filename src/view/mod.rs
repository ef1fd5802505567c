//! Generic server-backed view: fetch on mount and on filter change, expose
//! exactly one of loading / error / empty / ready at a time.
//!
//! A `DataView` owns at most one in-flight fetch. Starting a new fetch aborts
//! the previous task and bumps a generation counter; a completion carrying an
//! older generation is dropped, so the state always reflects the most recent
//! parameters. Fetch errors stop here as `ViewState::Error(message)` and never
//! reach the session.

pub mod export;
pub mod format;
pub mod page;
pub mod tables;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ClientError;

pub use export::{export_filename, CsvDocument, Tabular};
pub use page::PageWindow;
pub use tables::DisplayRow;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Not mounted yet, or unmounted
    Idle,
    Loading,
    Error(String),
    /// Fetch succeeded with no rows
    Empty,
    Ready(Vec<T>),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Error(_) => "error",
            ViewState::Empty => "empty",
            ViewState::Ready(_) => "ready",
        }
    }

    fn from_result(result: Result<Vec<T>, ClientError>) -> Self {
        match result {
            Ok(records) if records.is_empty() => ViewState::Empty,
            Ok(records) => ViewState::Ready(records),
            Err(e) => ViewState::Error(e.user_message()),
        }
    }
}

/// Sink for one render pass; exactly one method is called per pass
pub trait ViewRenderer<T> {
    fn loading(&mut self);
    fn error(&mut self, message: &str);
    fn empty(&mut self);
    fn ready(&mut self, records: &[T]);
}

type Fetch<P, T> = Arc<dyn Fn(P) -> BoxFuture<'static, Result<Vec<T>, ClientError>> + Send + Sync>;

pub struct DataView<P, T> {
    fetch: Fetch<P, T>,
    params: Option<P>,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<ViewState<T>>>,
    task: Option<JoinHandle<()>>,
}

impl<P, T> DataView<P, T>
where
    P: Clone + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, ClientError>> + Send + 'static,
    {
        let (state, _) = watch::channel(ViewState::Idle);
        Self {
            fetch: Arc::new(move |params| fetch(params).boxed()),
            params: None,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            task: None,
        }
    }

    pub fn mount(&mut self, params: P) {
        self.params = Some(params.clone());
        self.load(params);
    }

    /// Re-fetch only when the parameters actually changed
    pub fn set_params(&mut self, params: P) {
        if self.params.as_ref() == Some(&params) {
            return;
        }
        self.mount(params);
    }

    /// Fetch again with the current parameters, e.g. after a write
    pub fn refresh(&mut self) {
        if let Some(params) = self.params.clone() {
            self.load(params);
        }
    }

    pub fn unmount(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.params = None;
        self.state.send_replace(ViewState::Idle);
    }

    pub fn params(&self) -> Option<&P> {
        self.params.as_ref()
    }

    pub fn state(&self) -> ViewState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }

    /// Wait until the view leaves `Loading`
    pub async fn wait_settled(&self) -> ViewState<T> {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => ViewState::Idle,
        };
        settled
    }

    pub fn render(&self, renderer: &mut dyn ViewRenderer<T>) {
        match self.state() {
            ViewState::Idle | ViewState::Loading => renderer.loading(),
            ViewState::Error(message) => renderer.error(&message),
            ViewState::Empty => renderer.empty(),
            ViewState::Ready(records) => renderer.ready(&records),
        }
    }

    fn load(&mut self, params: P) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(ViewState::Loading);
        tracing::debug!(generation, "View loading");

        let fetch = (self.fetch)(params);
        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);

        self.task = Some(tokio::spawn(async move {
            let next = ViewState::from_result(fetch.await);

            let published = state.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = next;
                true
            });

            if published {
                tracing::debug!(generation, state = state.borrow().label(), "View settled");
            } else {
                tracing::debug!(generation, "Discarding stale response");
            }
        }));
    }
}

impl<P, T> Drop for DataView<P, T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
