use std::env;
use std::sync::Arc;

use storage::repository::SnapshotStore;

use crate::backend::BackendClient;
use crate::book_lookup::BookLookup;
use crate::error::ProgressError;
use crate::progress_store::ProgressStore;
use crate::Clock;

/// Endpoint configuration for the optional HTTP collaborators.
///
/// Either client is simply absent when its base URL is not configured; the
/// progress engine works fully offline.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub backend_base_url: Option<String>,
    pub lookup_base_url: Option<String>,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            backend_base_url: env::var("DORILOOP_BACKEND_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            lookup_base_url: env::var("DORILOOP_LOOKUP_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

/// Assembles the progress store and HTTP clients at the composition point.
///
/// Owns the `ProgressStore` lifecycle; callers borrow it from here rather
/// than reaching for any ambient global state.
pub struct AppServices {
    progress: ProgressStore,
    backend: Option<Arc<BackendClient>>,
    book_lookup: Option<Arc<BookLookup>>,
}

impl AppServices {
    /// Build services on top of the given snapshot store, loading the
    /// persisted collection.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Persistence` if the snapshot cannot be read
    /// or validated.
    pub async fn new(
        snapshots: Arc<dyn SnapshotStore>,
        clock: Clock,
        config: AppConfig,
    ) -> Result<Self, ProgressError> {
        let progress = ProgressStore::load(clock, snapshots).await?;
        let backend = config
            .backend_base_url
            .map(|url| Arc::new(BackendClient::new(url)));
        let book_lookup = config
            .lookup_base_url
            .map(|url| Arc::new(BookLookup::new(url)));

        Ok(Self {
            progress,
            backend,
            book_lookup,
        })
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressStore {
        &mut self.progress
    }

    #[must_use]
    pub fn backend(&self) -> Option<Arc<BackendClient>> {
        self.backend.clone()
    }

    #[must_use]
    pub fn book_lookup(&self) -> Option<Arc<BookLookup>> {
        self.book_lookup.clone()
    }
}
