pub mod config;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod model;
pub mod pagination;
pub mod reconcile;
pub mod storage;
pub mod store;
pub mod upload;
pub mod view;

pub use crate::config::Settings;
pub use dom::Container;
pub use error::{FetchError, StorageError, StoreError};
pub use fetch::{FetchClient, HttpTransport, RawResponse, Transport};
pub use model::{AppState, Ingredient, Recipe, SearchResult, SearchState};
pub use pagination::Pagination;
pub use reconcile::PatchReport;
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::Store;
pub use view::{Template, View};

/// Build a store over HTTP and file storage as described by `settings`
pub fn open_store(settings: &Settings) -> Result<Store, StoreError> {
    let client = FetchClient::http(settings.timeout())?;
    let storage = FileStorage::new(&settings.storage_path);
    Ok(Store::new(settings, client, Box::new(storage)))
}

/// Load settings from `forkify.toml` and the environment, then open the store
pub fn open_configured_store() -> Result<Store, StoreError> {
    let settings = Settings::load()?;
    open_store(&settings)
}
