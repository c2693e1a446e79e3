//! Debounced forward search. A newer keystroke aborts the pending query task,
//! so a superseded query never reaches the result list.

use std::{sync::Arc, time::Duration};

use shared::domain::SearchResult;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{config::PickerConfig, events::PickerEvent, geo_client::GeoService};

pub struct SearchController {
    geo: Arc<dyn GeoService>,
    events: broadcast::Sender<PickerEvent>,
    debounce: Duration,
    min_chars: usize,
    limit: u32,
    pending: std::sync::Mutex<Option<JoinHandle<()>>>,
    results: Arc<Mutex<Vec<SearchResult>>>,
}

impl SearchController {
    pub fn new(
        geo: Arc<dyn GeoService>,
        events: broadcast::Sender<PickerEvent>,
        config: &PickerConfig,
    ) -> Self {
        Self {
            geo,
            events,
            debounce: config.search_debounce,
            min_chars: config.search_min_chars,
            limit: config.search_limit,
            pending: std::sync::Mutex::new(None),
            results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn results(&self) -> Vec<SearchResult> {
        self.results.lock().await.clone()
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }

    /// Called on every keystroke with the full field contents.
    pub async fn input(&self, raw: &str) {
        let query = raw.trim().to_string();
        {
            let mut pending = match self.pending.lock() {
                Ok(pending) => pending,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(stale) = pending.take() {
                stale.abort();
            }

            if query.chars().count() >= self.min_chars {
                *pending = Some(self.schedule(query));
                return;
            }
        }

        publish(&self.results, &self.events, Vec::new()).await;
    }

    fn schedule(&self, query: String) -> JoinHandle<()> {
        let geo = Arc::clone(&self.geo);
        let results = Arc::clone(&self.results);
        let events = self.events.clone();
        let debounce = self.debounce;
        let limit = self.limit;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            debug!(query = %query, "running address search");
            let found = match geo.search(&query, limit).await {
                Ok(found) => found,
                Err(err) => {
                    warn!(error = %err, query = %query, "address search failed");
                    Vec::new()
                }
            };
            publish(&results, &events, found).await;
        })
    }

    /// Takes the result at `index` and closes the list.
    pub async fn choose(&self, index: usize) -> Option<SearchResult> {
        let chosen = self.results.lock().await.get(index).cloned()?;
        publish(&self.results, &self.events, Vec::new()).await;
        Some(chosen)
    }

    /// Cancels any pending query and empties the list.
    pub async fn clear(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(stale) = pending.take() {
                stale.abort();
            }
        }
        publish(&self.results, &self.events, Vec::new()).await;
    }
}

async fn publish(
    results: &Mutex<Vec<SearchResult>>,
    events: &broadcast::Sender<PickerEvent>,
    found: Vec<SearchResult>,
) {
    let mut current = results.lock().await;
    *current = found.clone();
    let _ = events.send(PickerEvent::SearchResults(found));
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
