//! Fan-Out Dispatcher
//!
//! Runs every adapter against the same prompt concurrently and collects
//! every outcome. One task per adapter; a failing, hanging or panicking
//! adapter only affects its own slot. Dropping the dispatch future aborts
//! all outstanding tasks.

use crate::error::{ProviderError, ProviderErrorKind};
use crate::provider::{ChatAdapter, ImageAdapter, ImageRef};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Default per-provider time budget
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of one provider call
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub provider: String,
    pub result: Result<T, ProviderError>,
}

/// All outcomes of one dispatch, in adapter order
#[derive(Debug, Clone)]
pub struct DispatchResult<T> {
    outcomes: Vec<Outcome<T>>,
}

impl<T> DispatchResult<T> {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Outcome<T>> {
        self.outcomes.iter()
    }

    /// First outcome recorded for `provider`
    pub fn get(&self, provider: &str) -> Option<&Result<T, ProviderError>> {
        self.outcomes
            .iter()
            .find(|o| o.provider == provider)
            .map(|o| &o.result)
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }
}

impl<T> IntoIterator for DispatchResult<T> {
    type Item = Outcome<T>;
    type IntoIter = std::vec::IntoIter<Outcome<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

/// Concurrent fan-out with a per-provider timeout
#[derive(Debug, Clone)]
pub struct Dispatcher {
    timeout: Option<Duration>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Some(DEFAULT_TIMEOUT))
    }
}

impl Dispatcher {
    /// `None` disables the timeout; a hung provider then hangs the batch
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Ask every chat adapter the same question
    pub async fn dispatch_chat(
        &self,
        prompt: &str,
        adapters: &[Arc<dyn ChatAdapter>],
    ) -> DispatchResult<String> {
        let prompt: Arc<str> = Arc::from(prompt);
        let calls = adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let prompt = Arc::clone(&prompt);
            (adapter.name().to_string(), async move {
                adapter.respond(&prompt).await
            })
        });
        self.fan_out(calls).await
    }

    /// Ask every image adapter for one image
    pub async fn dispatch_images(
        &self,
        prompt: &str,
        adapters: &[Arc<dyn ImageAdapter>],
    ) -> DispatchResult<ImageRef> {
        let prompt: Arc<str> = Arc::from(prompt);
        let calls = adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let prompt = Arc::clone(&prompt);
            (adapter.name().to_string(), async move {
                adapter.generate(&prompt).await
            })
        });
        self.fan_out(calls).await
    }

    /// Spawn one task per call, wait for all of them, keep input order
    pub async fn fan_out<T, F, I>(&self, calls: I) -> DispatchResult<T>
    where
        I: IntoIterator<Item = (String, F)>,
        F: Future<Output = Result<T, ProviderError>> + Send + 'static,
        T: Send + 'static,
    {
        let mut tasks = JoinSet::new();
        let mut names = Vec::new();
        let mut task_slots = HashMap::new();

        for (slot, (name, call)) in calls.into_iter().enumerate() {
            let provider = name.clone();
            let timeout = self.timeout;

            let handle = tasks.spawn(async move {
                let started = Instant::now();
                let result = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, call).await {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::timeout(&provider)),
                    },
                    None => call.await,
                };
                debug!(
                    provider = %provider,
                    ok = result.is_ok(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "provider call finished"
                );
                (slot, result)
            });

            task_slots.insert(handle.id(), slot);
            names.push(name);
        }

        let mut results: Vec<Option<Result<T, ProviderError>>> =
            names.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (slot, result))) => results[slot] = Some(result),
                Err(e) => {
                    if let Some(&slot) = task_slots.get(&e.id()) {
                        warn!(provider = %names[slot], error = %e, "provider task failed");
                        results[slot] = Some(Err(ProviderError::new(
                            names[slot].clone(),
                            ProviderErrorKind::Panicked(e.to_string()),
                        )));
                    }
                }
            }
        }

        let outcomes = names
            .into_iter()
            .zip(results)
            .map(|(provider, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(ProviderError::new(
                        provider.clone(),
                        ProviderErrorKind::Panicked("task produced no result".to_string()),
                    ))
                });
                Outcome { provider, result }
            })
            .collect();

        DispatchResult { outcomes }
    }
}
