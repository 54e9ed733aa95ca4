use scraper::{Html, Selector};

use crate::app::RecipeDetail;

/// Flattens the recipe body to plain text, one block element per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let Ok(blocks) = Selector::parse("h1, h2, h3, h4, p, li") else {
        return String::new();
    };

    let lines: Vec<String> = document
        .select(&blocks)
        .map(|el| {
            let text = el.text().collect::<Vec<_>>().join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            match el.value().name() {
                "li" => format!("  • {text}"),
                "h1" | "h2" | "h3" | "h4" => format!("\n{}", text.to_uppercase()),
                _ => text,
            }
        })
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.is_empty() {
        // no block structure, fall back to all text nodes
        return document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
    }
    lines.join("\n").trim_start().to_string()
}

pub fn render(detail: &RecipeDetail) -> String {
    let mut out = format!("📖 {}\n", detail.recipe.title());
    out.push_str("═══════════════════════════════════════\n");
    out.push_str(&html_to_text(&detail.html));
    out.push_str("\n═══════════════════════════════════════\n");

    for media in &detail.recipe.media {
        out.push_str(&format!("🖼️  {}\n", media.content_url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_become_lines() {
        let text = html_to_text(
            "<h1>Lasagne</h1><p>Layered   pasta.</p><ul><li>250 g sheets</li><li>500 g mince</li></ul>",
        );
        assert_eq!(
            text,
            "LASAGNE\nLayered pasta.\n  • 250 g sheets\n  • 500 g mince"
        );
    }

    #[test]
    fn bare_text_passes_through() {
        assert_eq!(html_to_text("just <b>text</b> here"), "just text here");
    }
}
