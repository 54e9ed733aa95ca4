use prettytable::{Cell, Row, Table};

use crate::models::Recipe;

use super::stars;

pub fn table(recipes: &[Recipe]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("#"),
        Cell::new("Name"),
        Cell::new("Rating"),
        Cell::new("Tags"),
        Cell::new("Media"),
    ]));

    for (index, recipe) in recipes.iter().enumerate() {
        let rating = recipe
            .rating()
            .map(stars)
            .unwrap_or_else(|| "-".to_string());
        let tags = if recipe.tags().is_empty() {
            "-".to_string()
        } else {
            recipe.tags().join(", ")
        };

        table.add_row(Row::new(vec![
            Cell::new(&index.to_string()),
            Cell::new(recipe.title()),
            Cell::new(&rating),
            Cell::new(&tags),
            Cell::new(&recipe.media.len().to_string()),
        ]));
    }
    table
}
