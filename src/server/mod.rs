//! In-memory reference implementation of the recipe API.
//!
//! Serves the same routes the client talks to so the CLI and the
//! integration tests have something real to run against.

mod storage;

pub use storage::{RecipeStorage, StoredRecipe, DRAFT_SLOTS};

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::models::{DraftRecipe, DraftRecipeUpdate, Recipe};

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub struct AppState {
    pub storage: Arc<RecipeStorage>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/recipes", get(list_recipes).delete(delete_recipe))
        .route("/api/v1/draftrecipe", get(get_draft).post(save_draft))
        .route("/api/v1/login", get(login_page))
        .route("/content/:name", get(recipe_content))
        .route(
            "/media/:slot_id",
            get(get_media).put(put_media).delete(delete_media),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DeleteRecipeParams {
    recipe_name: String,
}

async fn list_recipes(State(state): State<Arc<AppState>>) -> Json<Vec<Recipe>> {
    Json(state.storage.list_recipes().await)
}

async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteRecipeParams>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state
        .storage
        .delete_recipe(&params.recipe_name)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to delete recipe: {}", e),
            )
        })?;

    if !deleted {
        return Err((
            StatusCode::NOT_FOUND,
            format!("No recipe named {}", params.recipe_name),
        ));
    }
    info!(recipe = %params.recipe_name, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn recipe_content(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Html<String>, StatusCode> {
    state
        .storage
        .recipe_html(&name)
        .await
        .map(Html)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_draft(State(state): State<Arc<AppState>>) -> Json<DraftRecipe> {
    Json(state.storage.draft().await)
}

async fn save_draft(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DraftRecipeUpdate>,
) -> Result<Json<DraftRecipe>, (StatusCode, String)> {
    if let Some(rating) = &payload.user_rating {
        if !crate::models::is_valid_rating(rating.rating) {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "Rating must be between 0 and 5 in steps of 0.5".to_string(),
            ));
        }
    }

    let draft = state.storage.save_draft(payload).await;
    info!(name = %draft.name, "draft saved");
    Ok(Json(draft))
}

async fn put_media(
    State(state): State<Arc<AppState>>,
    Path(slot_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let size = body.len();

    if state
        .storage
        .put_media(&slot_id, content_type, body.to_vec())
        .await
    {
        info!(%slot_id, size, "media uploaded");
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn get_media(State(state): State<Arc<AppState>>, Path(slot_id): Path<String>) -> Response {
    match state.storage.get_media(&slot_id).await {
        Some(media) => (
            [(header::CONTENT_TYPE, media.content_type)],
            media.bytes,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_media(State(state): State<Arc<AppState>>, Path(slot_id): Path<String>) -> StatusCode {
    if state.storage.delete_media(&slot_id).await {
        info!(%slot_id, "media deleted");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn login_page() -> Html<&'static str> {
    Html("<h1>wasfeines</h1><p>Log in to see the recipes.</p>")
}
