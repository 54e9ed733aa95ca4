use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::{QueryState, RecipeApi};
use crate::error::ApiError;
use crate::lifetime::Lifetime;
use crate::models::DraftRecipe;

/// Last fetched server copy of the draft.
///
/// Refreshes may overlap (an upload batch and a delete each trigger one);
/// only the most recently issued one is allowed to land.
pub struct DraftStore {
    api: Arc<dyn RecipeApi>,
    state: RwLock<QueryState<DraftRecipe>>,
    lifetime: Lifetime,
}

impl DraftStore {
    pub fn new(api: Arc<dyn RecipeApi>) -> Self {
        Self {
            api,
            state: RwLock::new(QueryState::default()),
            lifetime: Lifetime::new(),
        }
    }

    pub async fn snapshot(&self) -> QueryState<DraftRecipe> {
        self.state.read().await.clone()
    }

    pub async fn draft(&self) -> Option<DraftRecipe> {
        self.state.read().await.data.clone()
    }

    /// Fetches the draft. The fetched value is returned even when a newer
    /// refresh has superseded it, but only the newest reaches the store.
    pub async fn refresh(&self) -> Result<DraftRecipe, ApiError> {
        let token = self.lifetime.issue();
        self.state.write().await.start();

        let result = self.api.get_draft().await;

        if !self.lifetime.is_latest(token) {
            debug!(seq = token.sequence(), "dropping superseded draft refresh");
            return result;
        }

        let mut state = self.state.write().await;
        match &result {
            Ok(draft) => state.succeed(draft.clone()),
            Err(err) => {
                warn!("Failed to refresh draft: {err}");
                state.fail(err.to_string());
            }
        }
        result
    }

    /// Stops any outstanding refresh from landing.
    pub async fn teardown(&self) {
        self.lifetime.invalidate();
        self.state.write().await.pending = false;
    }
}
