use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DraftError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerRating {
    pub reviewer: String,
    pub rating: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub added_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<ReviewerRating>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RecipeSummary {
    /// The single rating if present, otherwise the mean of the reviewers'.
    pub fn display_rating(&self) -> Option<f64> {
        if let Some(rating) = self.rating {
            return Some(rating);
        }
        if self.ratings.is_empty() {
            return None;
        }
        let total: f64 = self.ratings.iter().map(|r| r.rating).sum();
        Some(total / self.ratings.len() as f64)
    }
}

/// A published recipe. Read-only from the client's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub content_url: String,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RecipeSummary>,
}

impl Recipe {
    pub fn title(&self) -> &str {
        self.summary
            .as_ref()
            .and_then(|s| s.title.as_deref())
            .unwrap_or(&self.name)
    }

    pub fn rating(&self) -> Option<f64> {
        self.summary.as_ref().and_then(RecipeSummary::display_rating)
    }

    pub fn tags(&self) -> &[String] {
        self.summary
            .as_ref()
            .map(|s| s.tags.as_slice())
            .unwrap_or_default()
    }
}

/// Ratings run from 0 to 5 in half steps.
pub fn is_valid_rating(rating: f64) -> bool {
    (0.0..=5.0).contains(&rating) && (rating * 2.0).fract() == 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRating {
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl UserRating {
    pub fn new(rating: f64, comment: Option<String>) -> Result<Self, DraftError> {
        if !is_valid_rating(rating) {
            return Err(DraftError::InvalidRating(rating));
        }
        Ok(Self { rating, comment })
    }
}

/// A rating as stored by the server, attributed to its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub created_by: String,
    pub created_date: DateTime<Utc>,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// One upload position of a draft.
///
/// Empty slots carry a `put_url`; filled ones carry `get_url` and
/// `delete_url` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSlot {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub put_url: Option<String>,
    #[serde(default)]
    pub get_url: Option<String>,
    #[serde(default)]
    pub delete_url: Option<String>,
    #[serde(default)]
    pub create_timestamp: Option<f64>,
}

impl MediaSlot {
    pub fn is_empty(&self) -> bool {
        !self.exists
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftRecipe {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_content: Option<String>,
    #[serde(default)]
    pub user_tags: Vec<String>,
    #[serde(default)]
    pub user_rating: Option<UserRating>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub draft_media: Vec<MediaSlot>,
}

impl DraftRecipe {
    /// Slots that can take an upload, in server order.
    pub fn empty_slots(&self) -> Vec<&MediaSlot> {
        self.draft_media
            .iter()
            .filter(|slot| slot.is_empty() && slot.put_url.is_some())
            .collect()
    }

    /// Uploaded media, newest first.
    pub fn filled_media(&self) -> Vec<&MediaSlot> {
        let mut filled: Vec<&MediaSlot> =
            self.draft_media.iter().filter(|slot| slot.exists).collect();
        filled.sort_by(|a, b| {
            let a = a.create_timestamp.unwrap_or(0.0);
            let b = b.create_timestamp.unwrap_or(0.0);
            b.total_cmp(&a)
        });
        filled
    }

    /// A draft can only be published once it has at least one picture.
    pub fn is_publishable(&self) -> bool {
        self.draft_media.iter().any(|slot| slot.exists)
    }

    /// The rating the edit buffer starts from: the first stored rating,
    /// falling back to the echoed `user_rating`.
    pub fn current_rating(&self) -> Option<UserRating> {
        match self.ratings.first() {
            Some(rating) => Some(UserRating {
                rating: rating.rating,
                comment: rating.comment.clone(),
            }),
            None => self.user_rating.clone(),
        }
    }
}

/// Body of `POST /api/v1/draftrecipe`. Always a full representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftRecipeUpdate {
    pub name: String,
    pub user_content: Option<String>,
    pub user_tags: Vec<String>,
    pub user_rating: Option<UserRating>,
}
