//! The published recipe collection behind the feed, detail and list views.

mod reducer;

pub use reducer::{reduce, FeedAction, FeedPhase, FeedState};

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::api::RecipeApi;
use crate::error::ApiError;
use crate::lifetime::Lifetime;
use crate::models::Recipe;

/// Handles the hard redirect a 401 causes.
pub trait Redirect: Send + Sync {
    fn redirect(&self, url: &str);
}

/// Default handler: just logs where the user should go.
pub struct LogRedirect;

impl Redirect for LogRedirect {
    fn redirect(&self, url: &str) {
        warn!("Not logged in, redirecting to {url}");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed(String),
    /// 401: the redirect handler ran and the state was left untouched.
    Redirected,
    /// A newer fetch or a teardown made this one irrelevant.
    Superseded,
}

pub struct FeedStore {
    api: Arc<dyn RecipeApi>,
    redirect: Arc<dyn Redirect>,
    state: RwLock<FeedState>,
    lifetime: Lifetime,
    phases: broadcast::Sender<FeedPhase>,
}

impl FeedStore {
    pub fn new(api: Arc<dyn RecipeApi>, redirect: Arc<dyn Redirect>) -> Self {
        let (phases, _) = broadcast::channel(16);
        Self {
            api,
            redirect,
            state: RwLock::new(FeedState::default()),
            lifetime: Lifetime::new(),
            phases,
        }
    }

    pub async fn state(&self) -> FeedState {
        self.state.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedPhase> {
        self.phases.subscribe()
    }

    /// Recipe by position in the last fetched collection.
    ///
    /// Positions shift when the collection changes on the server between
    /// fetches; the API does not hand out a stable key to use instead.
    pub async fn recipe_at(&self, index: usize) -> Option<Recipe> {
        self.state.read().await.recipes.get(index).cloned()
    }

    /// Initial fetch when the feed is first shown.
    pub async fn load(&self) -> LoadOutcome {
        self.fetch().await
    }

    /// Explicit refetch, e.g. after a recipe was deleted.
    pub async fn refetch(&self) -> LoadOutcome {
        self.fetch().await
    }

    /// Drops any fetch still in flight.
    pub fn teardown(&self) {
        self.lifetime.invalidate();
    }

    async fn dispatch(&self, action: FeedAction) {
        let phase = action.phase();
        {
            let mut state = self.state.write().await;
            *state = reduce(std::mem::take(&mut *state), action);
        }
        debug!(?phase, "feed transition");
        // nobody listening is fine
        let _ = self.phases.send(phase);
    }

    async fn fetch(&self) -> LoadOutcome {
        let token = self.lifetime.issue();
        self.dispatch(FeedAction::FetchStart).await;

        let result = self.api.list_recipes().await;

        if !self.lifetime.is_latest(token) {
            debug!(seq = token.sequence(), "dropping superseded recipe fetch");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(recipes) => {
                let count = recipes.len();
                self.dispatch(FeedAction::FetchSuccess(recipes)).await;
                LoadOutcome::Loaded(count)
            }
            Err(ApiError::Unauthorized { login_url }) => {
                self.redirect.redirect(&login_url);
                LoadOutcome::Redirected
            }
            Err(err) => {
                let message = err.to_string();
                warn!("Failed to load recipes: {message}");
                self.dispatch(FeedAction::FetchError(message.clone())).await;
                LoadOutcome::Failed(message)
            }
        }
    }
}
