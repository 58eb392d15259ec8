//! Async wrapper around [`CardBinder`] for use in async runtimes.
//!
//! Runs all binder operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free. The
//! reconciliation pipeline itself stays strictly sequential — one API call
//! at a time — this wrapper only moves it off the async threads.
//!
//! # Example
//!
//! ```no_run
//! use cardbinder::AsyncCardBinder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let binder = AsyncCardBinder::builder().build().await.unwrap();
//!     let cards = binder.reconcile("spm").await.unwrap();
//!     println!("{} cards", cards.len());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{BinderError, Result};
use crate::models::Card;
use crate::{CardBinder, CollectionEntry};

// ---------------------------------------------------------------------------
// AsyncCardBinderBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCardBinder`].
#[derive(Default)]
pub struct AsyncCardBinderBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    data_dir: Option<PathBuf>,
}

impl AsyncCardBinderBuilder {
    /// Override the card API base URL.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom directory for persisted collection state.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the async binder on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncCardBinder> {
        tokio::task::spawn_blocking(move || {
            let mut builder = CardBinder::builder();
            if let Some(url) = self.base_url {
                builder = builder.base_url(&url);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            let binder = builder.build()?;
            Ok(AsyncCardBinder {
                inner: Arc::new(Mutex::new(binder)),
            })
        })
        .await
        .map_err(|e| BinderError::InvalidArgument(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCardBinder
// ---------------------------------------------------------------------------

/// Async wrapper around [`CardBinder`].
///
/// Operations are dispatched to a blocking thread pool; the sync binder is
/// protected by a [`Mutex`] since it uses `RefCell` internally.
pub struct AsyncCardBinder {
    inner: Arc<Mutex<CardBinder>>,
}

impl AsyncCardBinder {
    /// Create a new builder for configuring the async binder.
    pub fn builder() -> AsyncCardBinderBuilder {
        AsyncCardBinderBuilder::default()
    }

    /// Run any sync binder operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CardBinder) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let binder = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = binder
                .lock()
                .map_err(|_| BinderError::InvalidArgument("binder lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| BinderError::InvalidArgument(format!("task join error: {e}")))?
    }

    /// Reconcile a set's card list. See [`CardBinder::reconcile`].
    pub async fn reconcile(&self, set_code: &str) -> Result<Vec<Card>> {
        let code = set_code.to_string();
        self.run(move |b| b.reconcile(&code)).await
    }

    /// Mark a card collected or not. See [`CardBinder::set_collected`].
    pub async fn set_collected(
        &self,
        set_code: &str,
        card_id: &str,
        collected: bool,
    ) -> Result<CollectionEntry> {
        let code = set_code.to_string();
        let id = card_id.to_string();
        self.run(move |b| Ok(b.set_collected(&code, &id, collected)))
            .await
    }

    /// Set a card's foil flag. See [`CardBinder::set_foil`].
    pub async fn set_foil(
        &self,
        set_code: &str,
        card_id: &str,
        foil: bool,
    ) -> Result<CollectionEntry> {
        let code = set_code.to_string();
        let id = card_id.to_string();
        self.run(move |b| Ok(b.set_foil(&code, &id, foil))).await
    }
}
