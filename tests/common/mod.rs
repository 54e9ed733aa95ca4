//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use wasfeines::api::RecipeApi;
use wasfeines::error::ApiError;
use wasfeines::models::{DraftRecipe, DraftRecipeUpdate, MediaSlot, Recipe};
use wasfeines::server::{router, AppState, RecipeStorage};

pub const LOGIN_URL: &str = "http://fake/api/v1/login";

/// What the next `list_recipes` call answers.
#[derive(Debug, Clone)]
pub enum RecipesReply {
    Ok(Vec<Recipe>),
    Unauthorized,
    Fail(u16),
}

#[derive(Debug, Clone)]
pub struct SaveCall {
    pub update: DraftRecipeUpdate,
    pub at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutCall {
    pub put_url: String,
    pub content_type: String,
    pub len: usize,
}

/// A scriptable in-memory [`RecipeApi`] that records every call.
#[derive(Default)]
pub struct FakeApi {
    pub recipes: Mutex<Vec<Recipe>>,
    pub recipe_replies: Mutex<VecDeque<RecipesReply>>,
    pub recipe_delay: Mutex<VecDeque<Duration>>,
    pub list_calls: AtomicUsize,
    pub deleted_recipes: Mutex<Vec<String>>,

    pub draft: Mutex<DraftRecipe>,
    pub draft_fetches: AtomicUsize,
    pub draft_delay: Mutex<VecDeque<Duration>>,

    pub saves: Mutex<Vec<SaveCall>>,
    pub save_delays: Mutex<VecDeque<Duration>>,
    pub fail_saves: AtomicBool,

    pub puts: Mutex<Vec<PutCall>>,
    pub failing_puts: Mutex<HashSet<String>>,
    pub media_deletes: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_slots(filled: usize, empty: usize) -> Arc<Self> {
        let api = Self::default();
        {
            let mut draft = api.draft.lock().unwrap();
            for i in 0..filled {
                draft.draft_media.push(filled_slot(&format!("f{i}"), i as f64 + 1.0));
            }
            for i in 0..empty {
                draft.draft_media.push(empty_slot(&format!("e{i}")));
            }
        }
        Arc::new(api)
    }

    pub fn with_recipes(names: &[&str]) -> Arc<Self> {
        let api = Self::default();
        *api.recipes.lock().unwrap() = names.iter().map(|n| recipe(n)).collect();
        Arc::new(api)
    }

    pub fn script_recipes(&self, reply: RecipesReply) {
        self.recipe_replies.lock().unwrap().push_back(reply);
    }

    pub fn saves(&self) -> Vec<SaveCall> {
        self.saves.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<PutCall> {
        self.puts.lock().unwrap().clone()
    }

    pub fn draft_fetches(&self) -> usize {
        self.draft_fetches.load(Ordering::SeqCst)
    }
}

pub fn recipe(name: &str) -> Recipe {
    Recipe {
        name: name.to_string(),
        content_url: format!("http://fake/content/{name}"),
        media: Vec::new(),
        summary: None,
    }
}

pub fn empty_slot(id: &str) -> MediaSlot {
    MediaSlot {
        exists: false,
        put_url: Some(format!("http://fake/put/{id}")),
        get_url: None,
        delete_url: None,
        create_timestamp: None,
    }
}

pub fn filled_slot(id: &str, ts: f64) -> MediaSlot {
    MediaSlot {
        exists: true,
        put_url: None,
        get_url: Some(format!("http://fake/media/{id}")),
        delete_url: Some(format!("http://fake/media/{id}")),
        create_timestamp: Some(ts),
    }
}

async fn pause(queue: &Mutex<VecDeque<Duration>>) {
    let delay = queue.lock().unwrap().pop_front();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl RecipeApi for FakeApi {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.recipe_replies.lock().unwrap().pop_front();
        pause(&self.recipe_delay).await;

        match reply {
            Some(RecipesReply::Ok(recipes)) => Ok(recipes),
            Some(RecipesReply::Unauthorized) => Err(ApiError::Unauthorized {
                login_url: LOGIN_URL.to_string(),
            }),
            Some(RecipesReply::Fail(status)) => Err(ApiError::Status {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Ok(self.recipes.lock().unwrap().clone()),
        }
    }

    async fn delete_recipe(&self, name: &str) -> Result<(), ApiError> {
        self.deleted_recipes.lock().unwrap().push(name.to_string());
        self.recipes.lock().unwrap().retain(|r| r.name != name);
        Ok(())
    }

    async fn get_draft(&self) -> Result<DraftRecipe, ApiError> {
        self.draft_fetches.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.draft.lock().unwrap().clone();
        pause(&self.draft_delay).await;
        Ok(snapshot)
    }

    async fn save_draft(&self, update: &DraftRecipeUpdate) -> Result<DraftRecipe, ApiError> {
        self.saves.lock().unwrap().push(SaveCall {
            update: update.clone(),
            at: Instant::now(),
        });
        pause(&self.save_delays).await;

        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "save failed".to_string(),
            });
        }

        let mut draft = self.draft.lock().unwrap();
        draft.name = update.name.clone();
        draft.user_content = update.user_content.clone();
        draft.user_tags = update.user_tags.clone();
        draft.user_rating = update.user_rating.clone();
        Ok(draft.clone())
    }

    async fn upload_to_slot(
        &self,
        put_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ApiError> {
        self.puts.lock().unwrap().push(PutCall {
            put_url: put_url.to_string(),
            content_type: content_type.to_string(),
            len: bytes.len(),
        });
        tokio::task::yield_now().await;

        if self.failing_puts.lock().unwrap().contains(put_url) {
            return Err(ApiError::Status {
                status: 403,
                body: "expired".to_string(),
            });
        }

        let mut draft = self.draft.lock().unwrap();
        if let Some(slot) = draft
            .draft_media
            .iter_mut()
            .find(|s| s.put_url.as_deref() == Some(put_url))
        {
            let id = put_url.rsplit('/').next().unwrap_or_default().to_string();
            *slot = filled_slot(&id, 100.0);
        }
        Ok(())
    }

    async fn delete_media(&self, delete_url: &str) -> Result<(), ApiError> {
        self.media_deletes.lock().unwrap().push(delete_url.to_string());

        let mut draft = self.draft.lock().unwrap();
        if let Some(slot) = draft
            .draft_media
            .iter_mut()
            .find(|s| s.delete_url.as_deref() == Some(delete_url))
        {
            let id = delete_url.rsplit('/').next().unwrap_or_default().to_string();
            *slot = empty_slot(&id);
        }
        Ok(())
    }

    async fn fetch_content(&self, content_url: &str) -> Result<String, ApiError> {
        Ok(format!("<h1>{content_url}</h1><p>Body</p>"))
    }

    fn login_url(&self) -> String {
        LOGIN_URL.to_string()
    }
}

/// Records every redirect the feed asks for.
#[derive(Default)]
pub struct RecordingRedirect {
    pub urls: Mutex<Vec<String>>,
}

impl wasfeines::feed::Redirect for RecordingRedirect {
    fn redirect(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_string());
    }
}

/// Starts the reference server on an ephemeral port.
pub async fn spawn_server() -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let storage = Arc::new(
        RecipeStorage::new(dir.path().join("recipes.json"), format!("http://{addr}")).unwrap(),
    );
    let app = router(Arc::new(AppState { storage }));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, dir)
}
