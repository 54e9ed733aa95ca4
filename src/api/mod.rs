//! Remote recipe API.

mod client;
mod query;

pub use client::ApiClient;
pub use query::QueryState;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{DraftRecipe, DraftRecipeUpdate, Recipe};

pub const RECIPES_PATH: &str = "api/v1/recipes";
pub const DRAFT_PATH: &str = "api/v1/draftrecipe";
pub const LOGIN_PATH: &str = "api/v1/login";

/// Everything the stores and coordinators need from the server.
///
/// [`ApiClient`] is the real implementation; tests swap in fakes.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError>;

    async fn delete_recipe(&self, name: &str) -> Result<(), ApiError>;

    async fn get_draft(&self) -> Result<DraftRecipe, ApiError>;

    async fn save_draft(&self, update: &DraftRecipeUpdate) -> Result<DraftRecipe, ApiError>;

    /// Writes raw bytes straight to a slot's upload destination.
    async fn upload_to_slot(
        &self,
        put_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ApiError>;

    async fn delete_media(&self, delete_url: &str) -> Result<(), ApiError>;

    /// Fetches a recipe body (HTML).
    async fn fetch_content(&self, content_url: &str) -> Result<String, ApiError>;

    /// Where the user is sent when a request comes back 401.
    fn login_url(&self) -> String;
}
