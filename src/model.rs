use serde::{Deserialize, Serialize};

/// A single ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Absent quantities are never scaled
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

/// The currently displayed recipe, also the element type of the bookmark set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub publisher: String,
    pub source_url: String,
    pub image: String,
    pub servings: u32,
    pub cooking_time: u32,
    pub ingredients: Vec<Ingredient>,
    /// Present only on recipes uploaded with the caller's API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub bookmarked: bool,
}

impl Recipe {
    /// Rescale every quantity from the current servings to `new_servings`.
    ///
    /// `new_servings` must be at least 1; a zero here makes the next rescale divide by zero.
    pub fn scale_to(&mut self, new_servings: u32) {
        let old = f64::from(self.servings);
        let new = f64::from(new_servings);
        for ingredient in &mut self.ingredients {
            if let Some(quantity) = ingredient.quantity.as_mut() {
                *quantity = *quantity * new / old;
            }
        }
        self.servings = new_servings;
    }
}

/// Read-only projection of a recipe returned by search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub publisher: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Search query, its results and the page being viewed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub results_per_page: usize,
    /// 1-based
    pub page: usize,
}

impl SearchState {
    pub fn new(results_per_page: usize) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            results_per_page,
            page: 1,
        }
    }
}

/// Everything the store owns
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub recipe: Option<Recipe>,
    pub search: SearchState,
    /// Unique by id, insertion order is display order
    pub bookmarks: Vec<Recipe>,
}

impl AppState {
    pub fn new(results_per_page: usize) -> Self {
        Self {
            recipe: None,
            search: SearchState::new(results_per_page),
            bookmarks: Vec::new(),
        }
    }

    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.bookmarks.iter().any(|bookmark| bookmark.id == id)
    }
}

/// Wire shapes of the recipes API
pub mod api {
    use super::{Ingredient, Recipe, SearchResult};
    use serde::Deserialize;
    use std::num::NonZeroU32;

    #[derive(Debug, Deserialize)]
    pub struct RecipeEnvelope {
        pub data: RecipeData,
    }

    #[derive(Debug, Deserialize)]
    pub struct RecipeData {
        pub recipe: ApiRecipe,
    }

    #[derive(Debug, Deserialize)]
    pub struct ApiRecipe {
        pub id: String,
        pub title: String,
        pub publisher: String,
        pub source_url: String,
        pub image_url: String,
        pub servings: NonZeroU32,
        pub cooking_time: u32,
        pub ingredients: Vec<Ingredient>,
        #[serde(default)]
        pub key: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct SearchEnvelope {
        pub data: SearchData,
    }

    #[derive(Debug, Deserialize)]
    pub struct SearchData {
        pub recipes: Vec<ApiSearchResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ApiSearchResult {
        pub id: String,
        pub title: String,
        pub publisher: String,
        pub image_url: String,
        #[serde(default)]
        pub key: Option<String>,
    }

    impl From<RecipeEnvelope> for Recipe {
        fn from(envelope: RecipeEnvelope) -> Self {
            let recipe = envelope.data.recipe;
            Recipe {
                id: recipe.id,
                title: recipe.title,
                publisher: recipe.publisher,
                source_url: recipe.source_url,
                image: recipe.image_url,
                servings: recipe.servings.get(),
                cooking_time: recipe.cooking_time,
                ingredients: recipe.ingredients,
                key: recipe.key.filter(|key| !key.is_empty()),
                bookmarked: false,
            }
        }
    }

    impl From<ApiSearchResult> for SearchResult {
        fn from(result: ApiSearchResult) -> Self {
            SearchResult {
                id: result.id,
                title: result.title,
                publisher: result.publisher,
                image: result.image_url,
                key: result.key.filter(|key| !key.is_empty()),
            }
        }
    }
}
