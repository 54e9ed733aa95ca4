use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    DraftRecipe, DraftRecipeUpdate, Media, MediaSlot, Rating, Recipe, RecipeSummary,
};

pub const DRAFT_SLOTS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecipe {
    pub name: String,
    pub html: String,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub summary: Option<RecipeSummary>,
}

#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Slot {
    id: String,
    media: Option<StoredMedia>,
}

impl Slot {
    fn empty() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            media: None,
        }
    }
}

#[derive(Debug)]
struct Draft {
    update: DraftRecipeUpdate,
    ratings: Vec<Rating>,
    slots: Vec<Slot>,
}

/// In-memory state of the reference server. Published recipes are
/// persisted to a JSON file; the draft and its media live in memory only.
pub struct RecipeStorage {
    recipes: RwLock<Vec<StoredRecipe>>,
    draft: RwLock<Draft>,
    recipes_file: PathBuf,
    public_url: String,
}

impl RecipeStorage {
    pub fn new(recipes_file: impl Into<PathBuf>, public_url: impl Into<String>) -> Result<Self> {
        let recipes_file = recipes_file.into();
        let recipes = if Path::new(&recipes_file).exists() {
            let data = fs::read_to_string(&recipes_file)
                .context("Failed to read recipes file")?;
            serde_json::from_str(&data).context("Failed to parse recipes file")?
        } else {
            seed_recipes()
        };

        Ok(Self {
            recipes: RwLock::new(recipes),
            draft: RwLock::new(Draft {
                update: DraftRecipeUpdate::default(),
                ratings: Vec::new(),
                slots: (0..DRAFT_SLOTS).map(|_| Slot::empty()).collect(),
            }),
            recipes_file,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn list_recipes(&self) -> Vec<Recipe> {
        let recipes = self.recipes.read().await;
        recipes
            .iter()
            .map(|stored| Recipe {
                name: stored.name.clone(),
                content_url: self.url(&["content", &stored.name]),
                media: stored
                    .media
                    .iter()
                    .map(|url| Media {
                        name: None,
                        content_url: url.clone(),
                    })
                    .collect(),
                summary: stored.summary.clone(),
            })
            .collect()
    }

    pub async fn recipe_html(&self, name: &str) -> Option<String> {
        let recipes = self.recipes.read().await;
        recipes.iter().find(|r| r.name == name).map(|r| r.html.clone())
    }

    /// Returns false when no recipe has that name.
    pub async fn delete_recipe(&self, name: &str) -> Result<bool> {
        let mut recipes = self.recipes.write().await;
        let before = recipes.len();
        recipes.retain(|r| r.name != name);
        if recipes.len() == before {
            return Ok(false);
        }
        self.save_to_disk(&recipes)?;
        Ok(true)
    }

    pub async fn draft(&self) -> DraftRecipe {
        let draft = self.draft.read().await;
        self.render_draft(&draft)
    }

    pub async fn save_draft(&self, update: DraftRecipeUpdate) -> DraftRecipe {
        let mut draft = self.draft.write().await;
        draft.ratings = match &update.user_rating {
            Some(rating) => vec![Rating {
                created_by: "you".to_string(),
                created_date: Utc::now(),
                rating: rating.rating,
                comment: rating.comment.clone(),
            }],
            None => Vec::new(),
        };
        draft.update = update;
        self.render_draft(&draft)
    }

    /// Returns false for unknown slots.
    pub async fn put_media(&self, slot_id: &str, content_type: String, bytes: Vec<u8>) -> bool {
        let mut draft = self.draft.write().await;
        match draft.slots.iter_mut().find(|s| s.id == slot_id) {
            Some(slot) => {
                slot.media = Some(StoredMedia {
                    content_type,
                    bytes,
                    created_at: Utc::now(),
                });
                true
            }
            None => false,
        }
    }

    pub async fn get_media(&self, slot_id: &str) -> Option<StoredMedia> {
        let draft = self.draft.read().await;
        draft
            .slots
            .iter()
            .find(|s| s.id == slot_id)
            .and_then(|s| s.media.clone())
    }

    /// Empties a slot. Returns false when there was nothing in it.
    pub async fn delete_media(&self, slot_id: &str) -> bool {
        let mut draft = self.draft.write().await;
        match draft.slots.iter_mut().find(|s| s.id == slot_id) {
            Some(slot) => slot.media.take().is_some(),
            None => false,
        }
    }

    fn render_draft(&self, draft: &Draft) -> DraftRecipe {
        let draft_media = draft
            .slots
            .iter()
            .map(|slot| {
                let url = self.url(&["media", &slot.id]);
                match &slot.media {
                    Some(media) => MediaSlot {
                        exists: true,
                        put_url: None,
                        get_url: Some(url.clone()),
                        delete_url: Some(url),
                        create_timestamp: Some(media.created_at.timestamp_millis() as f64),
                    },
                    None => MediaSlot {
                        exists: false,
                        put_url: Some(url),
                        get_url: None,
                        delete_url: None,
                        create_timestamp: None,
                    },
                }
            })
            .collect();

        DraftRecipe {
            name: draft.update.name.clone(),
            user_content: draft.update.user_content.clone(),
            user_tags: draft.update.user_tags.clone(),
            user_rating: draft.update.user_rating.clone(),
            ratings: draft.ratings.clone(),
            draft_media,
        }
    }

    fn url(&self, segments: &[&str]) -> String {
        match Url::parse(&self.public_url) {
            Ok(mut url) => {
                if let Ok(mut path) = url.path_segments_mut() {
                    path.pop_if_empty().extend(segments);
                }
                url.into()
            }
            Err(_) => format!("{}/{}", self.public_url, segments.join("/")),
        }
    }

    fn save_to_disk(&self, recipes: &[StoredRecipe]) -> Result<()> {
        let json = serde_json::to_string_pretty(recipes)
            .context("Failed to serialize recipes")?;
        fs::write(&self.recipes_file, json)
            .context("Failed to write to recipes file")?;
        Ok(())
    }
}

fn seed_recipes() -> Vec<StoredRecipe> {
    vec![
        StoredRecipe {
            name: "Spaghetti Carbonara".to_string(),
            html: "<h1>Spaghetti Carbonara</h1>\
                   <p>Spaghetti Carbonara ist ein italienisches Nudelgericht aus Spaghetti, Speck, Eiern, Käse und Pfeffer.</p>\
                   <ul><li>500 g Spaghetti</li><li>2 Eier</li><li>100 g Speck</li></ul>"
                .to_string(),
            media: Vec::new(),
            summary: Some(RecipeSummary {
                title: Some("Spaghetti Carbonara".to_string()),
                added_by: Some("Anja".to_string()),
                rating: Some(4.5),
                description: Some("Italienisches Nudelgericht mit Speck und Ei.".to_string()),
                tags: vec!["pasta".to_string(), "schnell".to_string()],
                ..Default::default()
            }),
        },
        StoredRecipe {
            name: "Lasagne".to_string(),
            html: "<h1>Lasagne</h1>\
                   <p>Lasagne ist ein Nudelauflauf aus Italien. Die klassische Lasagne alla bolognese wird mit Fleischsauce, Béchamelsauce und Parmesan zubereitet.</p>\
                   <ul><li>250 g Lasagneplatten</li><li>500 g Hackfleisch</li><li>400 g Tomaten</li></ul>"
                .to_string(),
            media: Vec::new(),
            summary: Some(RecipeSummary {
                title: Some("Lasagne".to_string()),
                added_by: Some("Anja".to_string()),
                rating: Some(4.0),
                description: Some("Nudelauflauf alla bolognese.".to_string()),
                tags: vec!["pasta".to_string(), "ofen".to_string()],
                ..Default::default()
            }),
        },
    ]
}
