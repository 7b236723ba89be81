use crate::config::Settings;
use crate::error::{FetchError, StorageError, StoreError};
use crate::fetch::FetchClient;
use crate::model::api::{RecipeEnvelope, SearchEnvelope};
use crate::model::{AppState, Recipe, SearchResult, SearchState};
use crate::pagination::{page_slice, Pagination};
use crate::storage::KeyValueStore;
use crate::upload::UploadPayload;
use log::{debug, info, warn};
use reqwest::Url;
use std::cell::{Cell, RefCell};

/// Owner of the application state.
///
/// Every operation runs as one transaction against the state: asynchronous operations only
/// touch it after their request has resolved, and only when no newer request on the same
/// channel (recipe or search) was started in the meantime.
pub struct Store {
    state: RefCell<AppState>,
    client: FetchClient,
    storage: Box<dyn KeyValueStore>,
    api_url: String,
    api_key: String,
    bookmarks_key: String,
    recipe_request: Cell<u64>,
    search_request: Cell<u64>,
}

impl Store {
    /// Create a store and restore bookmarks from `storage`.
    ///
    /// Missing or unreadable bookmarks start the store with an empty set.
    pub fn new(settings: &Settings, client: FetchClient, storage: Box<dyn KeyValueStore>) -> Self {
        let mut state = AppState::new(settings.results_per_page);
        state.bookmarks = restore_bookmarks(storage.as_ref(), &settings.bookmarks_key);

        Self {
            state: RefCell::new(state),
            client,
            storage,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            bookmarks_key: settings.bookmarks_key.clone(),
            recipe_request: Cell::new(0),
            search_request: Cell::new(0),
        }
    }

    pub fn recipe(&self) -> Option<Recipe> {
        self.state.borrow().recipe.clone()
    }

    pub fn search(&self) -> SearchState {
        self.state.borrow().search.clone()
    }

    pub fn bookmarks(&self) -> Vec<Recipe> {
        self.state.borrow().bookmarks.clone()
    }

    /// Fetch recipe `id` and make it the current recipe
    pub async fn load_recipe(&self, id: &str) -> Result<(), StoreError> {
        let token = begin(&self.recipe_request);
        let url = self.endpoint(Some(id), &[])?;

        let envelope: RecipeEnvelope = self.client.fetch_as(url.as_str()).await?;
        if !is_latest(&self.recipe_request, token) {
            debug!("Discarding stale recipe response for '{}'", id);
            return Err(StoreError::Stale);
        }

        let mut recipe = Recipe::from(envelope);
        let mut state = self.state.borrow_mut();
        recipe.bookmarked = state.is_bookmarked(&recipe.id);
        info!("Loaded recipe '{}' ({})", recipe.title, recipe.id);
        state.recipe = Some(recipe);
        Ok(())
    }

    /// Search for `query`; on success the query, results and page 1 are committed together
    pub async fn load_search_results(&self, query: &str) -> Result<(), StoreError> {
        let token = begin(&self.search_request);
        let url = self.endpoint(None, &[("search", query)])?;

        let envelope: SearchEnvelope = self.client.fetch_as(url.as_str()).await?;
        if !is_latest(&self.search_request, token) {
            debug!("Discarding stale search response for '{}'", query);
            return Err(StoreError::Stale);
        }

        let results: Vec<SearchResult> = envelope
            .data
            .recipes
            .into_iter()
            .map(SearchResult::from)
            .collect();

        let mut state = self.state.borrow_mut();
        info!("Search '{}' returned {} results", query, results.len());
        state.search.query = query.to_string();
        state.search.page = 1;
        state.search.results = results;
        Ok(())
    }

    /// Select `page` and return its results; out-of-range pages give an empty list
    pub fn search_results_page(&self, page: usize) -> Vec<SearchResult> {
        let mut state = self.state.borrow_mut();
        state.search.page = page;
        page_slice(&state.search.results, page, state.search.results_per_page).to_vec()
    }

    /// Results of the currently selected page
    pub fn current_search_results_page(&self) -> Vec<SearchResult> {
        let page = self.state.borrow().search.page;
        self.search_results_page(page)
    }

    pub fn pagination(&self) -> Pagination {
        let state = self.state.borrow();
        Pagination::new(
            state.search.page,
            state.search.results.len(),
            state.search.results_per_page,
        )
    }

    /// Rescale the current recipe to `new_servings`.
    ///
    /// Callers must reject `new_servings < 1`; it is not checked here.
    pub fn update_servings(&self, new_servings: u32) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        let recipe = state.recipe.as_mut().ok_or(StoreError::NoRecipe)?;
        debug!(
            "Rescaling '{}' from {} to {} servings",
            recipe.id, recipe.servings, new_servings
        );
        recipe.scale_to(new_servings);
        Ok(())
    }

    /// Add `recipe` to the bookmarks; an id already present is not duplicated
    pub fn add_bookmark(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let mut bookmarks = self.state.borrow().bookmarks.clone();
        if !bookmarks.iter().any(|bookmark| bookmark.id == recipe.id) {
            let mut bookmark = recipe.clone();
            bookmark.bookmarked = true;
            bookmarks.push(bookmark);
        }
        self.persist(&bookmarks)?;

        let mut state = self.state.borrow_mut();
        state.bookmarks = bookmarks;
        if let Some(current) = state.recipe.as_mut().filter(|r| r.id == recipe.id) {
            current.bookmarked = true;
        }
        Ok(())
    }

    /// Remove the bookmark with `id`
    pub fn delete_bookmark(&self, id: &str) -> Result<(), StoreError> {
        let mut bookmarks = self.state.borrow().bookmarks.clone();
        let index = bookmarks
            .iter()
            .position(|bookmark| bookmark.id == id)
            .ok_or_else(|| StoreError::NotFoundLocal(id.to_string()))?;
        bookmarks.remove(index);
        self.persist(&bookmarks)?;

        let mut state = self.state.borrow_mut();
        state.bookmarks = bookmarks;
        if let Some(current) = state.recipe.as_mut().filter(|r| r.id == id) {
            current.bookmarked = false;
        }
        Ok(())
    }

    /// Bookmark the current recipe, or remove its bookmark if it has one.
    ///
    /// Returns whether the recipe is bookmarked afterwards.
    pub fn toggle_bookmark(&self) -> Result<bool, StoreError> {
        let recipe = self.recipe().ok_or(StoreError::NoRecipe)?;
        if recipe.bookmarked {
            self.delete_bookmark(&recipe.id)?;
            Ok(false)
        } else {
            self.add_bookmark(&recipe)?;
            Ok(true)
        }
    }

    /// Drop every bookmark, including the persisted copy
    pub fn clear_bookmarks(&self) -> Result<(), StoreError> {
        self.storage.remove(&self.bookmarks_key)?;

        let mut state = self.state.borrow_mut();
        state.bookmarks.clear();
        if let Some(current) = state.recipe.as_mut() {
            current.bookmarked = false;
        }
        info!("Cleared bookmarks");
        Ok(())
    }

    /// Upload a recipe from form fields and bookmark it.
    ///
    /// The uploaded recipe becomes current unless a newer recipe load was started meanwhile.
    pub async fn upload_recipe<K, V>(&self, fields: &[(K, V)]) -> Result<Recipe, StoreError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let payload = UploadPayload::from_form(fields)?;
        let token = begin(&self.recipe_request);
        let url = self.endpoint(None, &[])?;

        let envelope: RecipeEnvelope = self.client.send_as(url.as_str(), &payload).await?;
        let mut recipe = Recipe::from(envelope);
        recipe.bookmarked = true;

        // Bookmarking does not depend on the request token; only the current recipe does
        let mut bookmarks = self.state.borrow().bookmarks.clone();
        if !bookmarks.iter().any(|bookmark| bookmark.id == recipe.id) {
            bookmarks.push(recipe.clone());
        }
        self.persist(&bookmarks)?;

        let mut state = self.state.borrow_mut();
        state.bookmarks = bookmarks;
        if is_latest(&self.recipe_request, token) {
            state.recipe = Some(recipe.clone());
        } else {
            debug!(
                "Upload of '{}' finished after a newer load; keeping the current recipe",
                recipe.id
            );
            if let Some(current) = state.recipe.as_mut().filter(|r| r.id == recipe.id) {
                current.bookmarked = true;
            }
        }
        info!("Uploaded recipe '{}' ({})", recipe.title, recipe.id);
        Ok(recipe)
    }

    fn persist(&self, bookmarks: &[Recipe]) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(bookmarks).map_err(StorageError::from)?;
        self.storage.set(&self.bookmarks_key, &serialized)?;
        debug!("Persisted {} bookmarks", bookmarks.len());
        Ok(())
    }

    /// `{api_url}[/{id}]?{query}&key={api_key}`
    fn endpoint(&self, id: Option<&str>, query: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| FetchError::Transport(format!("invalid API url '{}': {}", self.api_url, e)))?;

        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| FetchError::Transport(format!("API url '{}' cannot take a path", self.api_url)))?
                .pop_if_empty()
                .push(id);
        }

        url.query_pairs_mut()
            .extend_pairs(query.iter().copied())
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

fn restore_bookmarks(storage: &dyn KeyValueStore, key: &str) -> Vec<Recipe> {
    let stored = match storage.get(key) {
        Ok(Some(stored)) => stored,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Could not read bookmarks: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Recipe>>(&stored) {
        Ok(mut bookmarks) => {
            let mut seen = std::collections::HashSet::new();
            bookmarks.retain(|bookmark| seen.insert(bookmark.id.clone()));
            debug!("Restored {} bookmarks", bookmarks.len());
            bookmarks
        }
        Err(e) => {
            warn!("Ignoring unparseable bookmarks: {}", e);
            Vec::new()
        }
    }
}

fn begin(channel: &Cell<u64>) -> u64 {
    let token = channel.get() + 1;
    channel.set(token);
    token
}

fn is_latest(channel: &Cell<u64>, token: u64) -> bool {
    channel.get() == token
}
