use std::sync::Arc;

use tracing::info;

use crate::api::{ApiClient, RecipeApi};
use crate::config::ClientConfig;
use crate::draft::{
    AutosaveCoordinator, DraftStore, FieldEdit, LocalFile, UploadCoordinator, UploadReport,
};
use crate::error::{ApiError, AppError, UploadError};
use crate::feed::{FeedStore, LoadOutcome, Redirect};
use crate::models::{DraftRecipe, MediaSlot, Recipe};

/// A recipe opened from the feed, with its body fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetail {
    pub index: usize,
    pub recipe: Recipe,
    pub html: String,
}

/// Root of the client: owns every store and is the only entry point for
/// user actions.
pub struct App {
    api: Arc<dyn RecipeApi>,
    feed: FeedStore,
    draft: Arc<DraftStore>,
    autosave: AutosaveCoordinator,
    uploads: UploadCoordinator,
}

impl App {
    pub fn new(api: Arc<dyn RecipeApi>, config: &ClientConfig, redirect: Arc<dyn Redirect>) -> Self {
        let draft = Arc::new(DraftStore::new(Arc::clone(&api)));
        Self {
            feed: FeedStore::new(Arc::clone(&api), redirect),
            autosave: AutosaveCoordinator::new(Arc::clone(&api), config.autosave_quiet),
            uploads: UploadCoordinator::new(Arc::clone(&api), Arc::clone(&draft)),
            draft,
            api,
        }
    }

    /// Builds an app backed by the HTTP client.
    pub fn connect(config: &ClientConfig, redirect: Arc<dyn Redirect>) -> Result<Self, ApiError> {
        let client = ApiClient::new(config)?;
        Ok(Self::new(Arc::new(client), config, redirect))
    }

    pub fn feed(&self) -> &FeedStore {
        &self.feed
    }

    pub fn draft(&self) -> &DraftStore {
        &self.draft
    }

    pub fn autosave(&self) -> &AutosaveCoordinator {
        &self.autosave
    }

    pub async fn open_feed(&self) -> LoadOutcome {
        self.feed.load().await
    }

    /// Opens the recipe at `index` of the last fetched feed.
    pub async fn open_detail(&self, index: usize) -> Result<RecipeDetail, AppError> {
        let recipe = self
            .feed
            .recipe_at(index)
            .await
            .ok_or(AppError::NoSuchRecipe(index))?;
        if recipe.content_url.is_empty() {
            return Err(AppError::NoContent(index));
        }

        let html = self.api.fetch_content(&recipe.content_url).await?;
        Ok(RecipeDetail {
            index,
            recipe,
            html,
        })
    }

    /// Deletes the recipe at `index` by name, then refetches the feed.
    pub async fn delete_recipe(&self, index: usize) -> Result<Recipe, AppError> {
        let recipe = self
            .feed
            .recipe_at(index)
            .await
            .ok_or(AppError::NoSuchRecipe(index))?;

        self.api.delete_recipe(&recipe.name).await?;
        info!(recipe = %recipe.name, index, "recipe deleted");
        self.feed.refetch().await;
        Ok(recipe)
    }

    /// Fetches the draft and seeds the edit buffer from the stored copy.
    ///
    /// When a newer refresh overlapped this one, the buffer gets that newer
    /// copy rather than what this fetch returned.
    pub async fn open_draft(&self) -> Result<DraftRecipe, ApiError> {
        let fetched = self.draft.refresh().await?;
        let draft = self.draft.draft().await.unwrap_or(fetched);
        self.autosave.seed(&draft).await;
        Ok(draft)
    }

    pub async fn edit(&self, edit: FieldEdit) {
        self.autosave.update(edit).await;
    }

    pub async fn upload(&self, files: Vec<LocalFile>) -> Result<UploadReport, AppError> {
        Ok(self.uploads.upload(files).await?)
    }

    /// Deletes the `position`-th uploaded item in display order
    /// (newest first).
    pub async fn delete_media(&self, position: usize) -> Result<MediaSlot, AppError> {
        let draft = self
            .draft
            .draft()
            .await
            .ok_or(AppError::Upload(UploadError::DraftNotLoaded))?;
        let slot = draft
            .filled_media()
            .get(position)
            .map(|slot| (*slot).clone())
            .ok_or(AppError::NoSuchMedia(position))?;

        self.uploads.delete(&slot).await?;
        Ok(slot)
    }

    /// Saves pending edits and waits for them before the app goes away.
    pub async fn flush(&self) {
        self.autosave.flush().await;
    }

    /// Stops every outstanding request from touching state.
    pub async fn teardown(&self) {
        self.feed.teardown();
        self.draft.teardown().await;
        self.autosave.teardown().await;
    }
}
