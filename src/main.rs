use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wasfeines::config::ServerConfig;
use wasfeines::server::{router, AppState, RecipeStorage};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    let storage = Arc::new(
        RecipeStorage::new(&config.recipes_file, config.public_url.clone())
            .context("Failed to initialize storage")?,
    );

    let app = router(Arc::new(AppState { storage }));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    println!("🚀 Recipe API running on http://{}", config.bind);
    println!("📋 Endpoints:");
    println!("   GET    /api/v1/recipes       - List published recipes");
    println!("   DELETE /api/v1/recipes       - Delete a recipe (?recipe_name=)");
    println!("   GET    /api/v1/draftrecipe   - Fetch the draft and its media slots");
    println!("   POST   /api/v1/draftrecipe   - Save draft fields");
    println!("   PUT    /media/:slot_id       - Upload into a slot");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;
    Ok(())
}
