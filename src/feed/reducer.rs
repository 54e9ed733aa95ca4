use crate::models::Recipe;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedAction {
    FetchStart,
    FetchSuccess(Vec<Recipe>),
    FetchError(String),
}

impl FeedAction {
    pub fn phase(&self) -> FeedPhase {
        match self {
            FeedAction::FetchStart => FeedPhase::Start,
            FeedAction::FetchSuccess(_) => FeedPhase::Success,
            FeedAction::FetchError(_) => FeedPhase::Error,
        }
    }
}

/// Emitted to subscribers on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Start,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub recipes: Vec<Recipe>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for FeedState {
    /// Not loaded yet: the feed shows its skeleton until the first fetch
    /// lands.
    fn default() -> Self {
        Self {
            recipes: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

pub fn reduce(state: FeedState, action: FeedAction) -> FeedState {
    match action {
        FeedAction::FetchStart => FeedState {
            loading: true,
            error: None,
            ..state
        },
        FeedAction::FetchSuccess(recipes) => FeedState {
            recipes,
            loading: false,
            error: None,
        },
        // the collection keeps its last known value
        FeedAction::FetchError(message) => FeedState {
            loading: false,
            error: Some(message),
            ..state
        },
    }
}
