use std::sync::Arc;
use std::time::Duration;

use slog::{debug, info, o, warn, Logger};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

use crate::{Debouncer, FetchError, Place, SearchProvider, ViewportHandle};

#[derive(Debug)]
enum SearchEvent {
    QueryChanged(String),
    QueryDue(String),
    Results {
        generation: u64,
        query: String,
        result: Result<Vec<Place>, FetchError>,
    },
    Select(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Place>,
    pub loading: bool,
}

/// Debounced place search feeding picked results into the viewport
///
/// Shares the refresh discipline of the viewport: one pending timer,
/// superseded queries are cancelled, and results from an outdated query
/// are dropped by generation.
pub struct SearchDebouncer {
    provider: Arc<dyn SearchProvider>,
    viewport: ViewportHandle,
    commands: UnboundedReceiver<SearchEvent>,
    internal_tx: UnboundedSender<SearchEvent>,
    internal_rx: UnboundedReceiver<SearchEvent>,
    debouncer: Debouncer<SearchEvent>,
    generation: u64,
    state: SearchState,
    state_tx: watch::Sender<SearchState>,
    logger: Logger,
}

impl SearchDebouncer {
    pub fn spawn(
        delay: Duration,
        provider: Arc<dyn SearchProvider>,
        viewport: ViewportHandle,
        logger: Logger,
    ) -> SearchHandle {
        let (command_tx, commands) = unbounded_channel();
        let (internal_tx, internal_rx) = unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::default());

        let search = SearchDebouncer {
            provider,
            viewport,
            commands,
            debouncer: Debouncer::new(delay, internal_tx.clone()),
            internal_tx,
            internal_rx,
            generation: 0,
            state: SearchState::default(),
            state_tx,
            logger: logger.new(o!("component" => "search")),
        };
        tokio::spawn(search.run());

        SearchHandle {
            tx: command_tx,
            state: state_rx,
        }
    }

    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
                Some(event) = self.internal_rx.recv() => event,
            };
            self.handle(event);
            self.state_tx.send_if_modified(|current| {
                if *current == self.state {
                    false
                } else {
                    *current = self.state.clone();
                    true
                }
            });
        }
        self.debouncer.cancel();
    }

    fn handle(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::QueryChanged(query) => {
                if query.trim().is_empty() {
                    // No waiting and no request for a blank box
                    self.debouncer.cancel();
                    self.invalidate();
                } else {
                    // Whatever is in flight answers an older query now
                    self.generation += 1;
                    self.state.loading = false;
                    self.debouncer.schedule(SearchEvent::QueryDue(query.clone()));
                }
                self.state.query = query;
            }
            SearchEvent::QueryDue(query) => {
                self.generation += 1;
                self.state.loading = true;
                let generation = self.generation;
                let provider = Arc::clone(&self.provider);
                let tx = self.internal_tx.clone();
                tokio::spawn(async move {
                    let result = provider.search(&query).await;
                    let _ = tx.send(SearchEvent::Results {
                        generation,
                        query,
                        result,
                    });
                });
            }
            SearchEvent::Results {
                generation,
                query,
                result,
            } => {
                if generation != self.generation {
                    debug!(self.logger, "discarding stale search results"; "query" => query);
                    return;
                }
                self.state.loading = false;
                match result {
                    Ok(places) => self.state.results = places,
                    // Keep the last good list on screen
                    Err(err) => {
                        warn!(self.logger, "search failed";
                            "query" => query, "kind" => err.kind(), "error" => %err);
                    }
                }
            }
            SearchEvent::Select(index) => match self.state.results.get(index).cloned() {
                Some(place) => {
                    info!(self.logger, "flying to search result";
                        "label" => &place.label, "center" => %place.center);
                    self.viewport.fly_to(place.center);
                    self.debouncer.cancel();
                    self.invalidate();
                    self.state.query.clear();
                }
                None => debug!(self.logger, "ignoring selection out of range"; "index" => index),
            },
        }
    }

    /// Clear results and make any in-flight search stale
    fn invalidate(&mut self) {
        self.generation += 1;
        self.state.results.clear();
        self.state.loading = false;
    }
}

/// Presentation-side access to a running search box
#[derive(Clone)]
pub struct SearchHandle {
    tx: UnboundedSender<SearchEvent>,
    state: watch::Receiver<SearchState>,
}

impl SearchHandle {
    pub fn set_query(&self, query: impl Into<String>) {
        let _ = self.tx.send(SearchEvent::QueryChanged(query.into()));
    }

    /// Pick the `index`-th result of the current list
    pub fn select(&self, index: usize) {
        let _ = self.tx.send(SearchEvent::Select(index));
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }
}
