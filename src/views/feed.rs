use crate::feed::FeedState;
use crate::models::Recipe;

use super::stars;

/// One full-screen card of the feed.
pub fn render_card(index: usize, total: usize, recipe: &Recipe) -> String {
    let mut out = String::new();
    out.push_str(&format!("🍽️  {}  ({}/{})\n", recipe.title(), index + 1, total));

    match recipe.media.first() {
        Some(media) => out.push_str(&format!("   🖼️  {}\n", media.content_url)),
        None => out.push_str("   🖼️  (no picture)\n"),
    }

    if let Some(rating) = recipe.rating() {
        out.push_str(&format!("   {} {:.1}\n", stars(rating), rating));
    }

    if let Some(summary) = &recipe.summary {
        if let Some(added_by) = &summary.added_by {
            match summary.created_at {
                Some(created_at) => out.push_str(&format!(
                    "   👤 {} · {}\n",
                    added_by,
                    created_at.format("%Y-%m-%d")
                )),
                None => out.push_str(&format!("   👤 {}\n", added_by)),
            }
        }
        if let Some(description) = &summary.description {
            out.push_str(&format!("   {}\n", description));
        }
    }

    if !recipe.tags().is_empty() {
        out.push_str(&format!("   🏷️  {}\n", recipe.tags().join(", ")));
    }
    out
}

/// The whole feed state: skeleton, error or the card at `index`.
pub fn render(state: &FeedState, index: usize) -> String {
    if state.loading && state.recipes.is_empty() {
        return "⏳ Loading recipes...\n".to_string();
    }

    let mut out = String::new();
    if let Some(error) = &state.error {
        out.push_str(&format!("⚠️  Could not load recipes: {}\n", error));
    }
    match state.recipes.get(index) {
        Some(recipe) => out.push_str(&render_card(index, state.recipes.len(), recipe)),
        None if state.recipes.is_empty() => out.push_str("📭 No recipes yet.\n"),
        None => out.push_str(&format!("📭 No recipe at position {}.\n", index + 1)),
    }
    out
}
