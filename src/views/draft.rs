use crate::draft::{EditBuffer, SaveStatus};
use crate::models::DraftRecipe;

use super::stars;

/// The add-recipe screen: uploaded media, the edit buffer and save state.
pub fn render(draft: &DraftRecipe, buffer: &EditBuffer, status: &SaveStatus) -> String {
    let mut out = String::from("📝 Draft recipe\n");
    out.push_str("═══════════════════════════════════════\n");

    let filled = draft.filled_media();
    if filled.is_empty() {
        out.push_str("🖼️  No pictures yet\n");
    }
    for (position, slot) in filled.iter().enumerate() {
        let url = slot.get_url.as_deref().unwrap_or("-");
        out.push_str(&format!("🖼️  [{}] {}\n", position, url));
    }
    out.push_str(&format!("📦 Free slots: {}\n", draft.empty_slots().len()));

    let name = if buffer.name.is_empty() {
        "(generated on publish)"
    } else {
        &buffer.name
    };
    out.push_str(&format!("🍽️  Name: {}\n", name));

    if let Some(content) = &buffer.user_content {
        out.push_str(&format!("📖 Description: {}\n", content));
    }
    if !buffer.user_tags.is_empty() {
        out.push_str(&format!("🏷️  Tags: {}\n", buffer.user_tags.join(", ")));
    }
    if let Some(rating) = &buffer.user_rating {
        out.push_str(&format!("⭐ {} {:.1}", stars(rating.rating), rating.rating));
        if let Some(comment) = &rating.comment {
            out.push_str(&format!(" ({})", comment));
        }
        out.push('\n');
    }

    out.push_str(&format!("💾 {}\n", save_line(status)));
    out.push_str(if draft.is_publishable() && !status.is_pending() {
        "✅ Ready to create\n"
    } else {
        "⏳ Add a picture to create the recipe\n"
    });
    out
}

fn save_line(status: &SaveStatus) -> String {
    if status.is_pending() {
        return "Saving...".to_string();
    }
    if let Some(error) = &status.last_error {
        return format!("Not saved: {}", error);
    }
    if status.dirty {
        return "Unsaved changes".to_string();
    }
    "All changes saved".to_string()
}
