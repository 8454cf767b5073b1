use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::{PriceStream, QuoteClient, StreamHandle, StreamSettings, Symbol};

/// Owns the running price streams, at most one per symbol.
///
/// Dropping the registry cancels every outstanding stream; use
/// [`StreamRegistry::shutdown`] to also wait for their tasks to exit.
#[derive(Debug)]
pub struct StreamRegistry {
    client: QuoteClient,
    settings: StreamSettings,
    streams: Mutex<HashMap<Symbol, Arc<StreamHandle>>>,
}

impl StreamRegistry {
    pub fn new(client: QuoteClient, settings: StreamSettings) -> Self {
        Self {
            client,
            settings,
            streams: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> StreamSettings {
        self.settings
    }

    fn lock_streams(&self) -> MutexGuard<'_, HashMap<Symbol, Arc<StreamHandle>>> {
        self.streams.lock().unwrap_or_else(|poisoned| {
            warn!("stream registry mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Starts streaming `symbol`, or returns the stream already running for it.
    ///
    /// A leftover stream that faulted or was cancelled is replaced.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(&self, symbol: &Symbol) -> Arc<StreamHandle> {
        let mut streams = self.lock_streams();

        if let Some(existing) = streams.get(symbol) {
            if existing.is_running() {
                debug!(symbol = %symbol, "price stream already running");
                return Arc::clone(existing);
            }
            debug!(symbol = %symbol, state = %existing.state(), "replacing finished price stream");
            existing.cancel();
        }

        let handle = Arc::new(
            PriceStream::new(symbol.clone(), self.client.clone(), self.settings).spawn(),
        );
        streams.insert(symbol.clone(), Arc::clone(&handle));
        handle
    }

    /// Stops the stream for `symbol` and waits for it to exit.
    ///
    /// Returns `false` when no stream was registered.
    pub async fn stop(&self, symbol: &Symbol) -> bool {
        let removed = self.lock_streams().remove(symbol);
        match removed {
            Some(handle) => {
                handle.stop().await;
                info!(symbol = %symbol, "price stream stopped");
                true
            }
            None => false,
        }
    }

    /// Stops every registered stream.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.lock_streams().drain().map(|(_, h)| h).collect();
        let count = handles.len();
        for handle in handles {
            handle.stop().await;
        }
        info!(count, "stream registry shut down");
    }

    pub fn get(&self, symbol: &Symbol) -> Option<Arc<StreamHandle>> {
        self.lock_streams().get(symbol).cloned()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.lock_streams().contains_key(symbol)
    }

    /// Number of registered handles, running or not.
    pub fn len(&self) -> usize {
        self.lock_streams().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_streams().is_empty()
    }

    pub fn active_symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<_> = self
            .lock_streams()
            .iter()
            .filter(|(_, handle)| handle.is_running())
            .map(|(symbol, _)| symbol.clone())
            .collect();
        symbols.sort();
        symbols
    }
}

impl Drop for StreamRegistry {
    fn drop(&mut self) {
        let streams = self.streams.get_mut().unwrap_or_else(|p| p.into_inner());
        for handle in streams.values() {
            handle.cancel();
        }
    }
}
