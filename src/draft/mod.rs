//! The draft recipe being authored: server copy, local edits, uploads.

mod autosave;
mod store;
mod upload;

pub use autosave::{AutosaveCoordinator, SaveStatus};
pub use store::DraftStore;
pub use upload::{LocalFile, SlotUpload, UploadCoordinator, UploadReport};

use tracing::warn;

use crate::models::{is_valid_rating, DraftRecipe, DraftRecipeUpdate, UserRating};

/// A single change coming from an input.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Name(String),
    Content(Option<String>),
    Tags(Vec<String>),
    /// Ratings off the half-star scale are dropped.
    Rating(Option<UserRating>),
    /// Enter in the tag input. Trimmed; blank input is ignored.
    AddTag(String),
    /// Removes every occurrence of the tag.
    RemoveTag(String),
}

/// Local copy of the editable draft fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBuffer {
    pub name: String,
    pub user_content: Option<String>,
    pub user_tags: Vec<String>,
    pub user_rating: Option<UserRating>,
}

impl EditBuffer {
    pub fn from_draft(draft: &DraftRecipe) -> Self {
        Self {
            name: draft.name.clone(),
            user_content: draft.user_content.clone(),
            user_tags: draft.user_tags.clone(),
            user_rating: draft.current_rating(),
        }
    }

    /// Applies `edit`, returning false when it changed nothing worth saving.
    pub fn apply(&mut self, edit: FieldEdit) -> bool {
        match edit {
            FieldEdit::Name(name) => self.name = name,
            FieldEdit::Content(content) => self.user_content = content,
            FieldEdit::Tags(tags) => self.user_tags = tags,
            FieldEdit::Rating(Some(rating)) if !is_valid_rating(rating.rating) => {
                warn!(rating = rating.rating, "ignoring rating off the 0-5 half-star scale");
                return false;
            }
            FieldEdit::Rating(rating) => self.user_rating = rating,
            FieldEdit::AddTag(tag) => {
                let tag = tag.trim();
                if tag.is_empty() {
                    return false;
                }
                self.user_tags.push(tag.to_string());
            }
            FieldEdit::RemoveTag(tag) => {
                let before = self.user_tags.len();
                self.user_tags.retain(|t| *t != tag);
                if self.user_tags.len() == before {
                    return false;
                }
            }
        }
        true
    }

    pub fn to_update(&self) -> DraftRecipeUpdate {
        DraftRecipeUpdate {
            name: self.name.clone(),
            user_content: self.user_content.clone(),
            user_tags: self.user_tags.clone(),
            user_rating: self.user_rating.clone(),
        }
    }
}
