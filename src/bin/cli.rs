use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wasfeines::app::App;
use wasfeines::config::ClientConfig;
use wasfeines::draft::{FieldEdit, LocalFile};
use wasfeines::feed::{LoadOutcome, Redirect};
use wasfeines::models::UserRating;
use wasfeines::views;

#[derive(Parser)]
#[command(name = "wasfeines")]
#[command(about = "Browse recipes and write new ones", long_about = None)]
struct Cli {
    #[arg(long, env = "WASFEINES_API_URL", help = "Base URL of the recipe API")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Swipe through the recipe feed")]
    Feed {
        #[arg(short, long, default_value_t = 0, help = "Card to start at")]
        start: usize,
    },

    #[command(about = "Show a recipe by its position in the feed")]
    Show { index: usize },

    #[command(about = "Delete a recipe by its position in the feed")]
    Delete { index: usize },

    #[command(about = "List all recipes")]
    List,

    #[command(about = "Show the draft recipe")]
    Draft,

    #[command(about = "Edit the draft interactively, changes are saved as you type")]
    Edit,

    #[command(about = "Set draft fields")]
    Set {
        #[arg(short, long, help = "Recipe name (empty to have one generated)")]
        name: Option<String>,

        #[arg(short, long, help = "Description")]
        description: Option<String>,

        #[arg(short, long, help = "Rating from 0 to 5 in steps of 0.5")]
        rating: Option<f64>,

        #[arg(short, long, help = "Comment for the rating")]
        comment: Option<String>,
    },

    #[command(about = "Add or remove draft tags")]
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    #[command(about = "Upload pictures into the draft")]
    Upload {
        #[arg(required = true, help = "Files to upload")]
        files: Vec<String>,
    },

    #[command(about = "Remove an uploaded picture by its position in the draft")]
    Unslot { position: usize },
}

#[derive(Subcommand)]
enum TagAction {
    Add { tag: String },
    Remove { tag: String },
}

/// Sends the user to the login page instead of showing an error.
struct LoginPrompt;

impl Redirect for LoginPrompt {
    fn redirect(&self, url: &str) {
        println!("🔐 You need to log in first: {}", url);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url).context("Invalid --api-url")?;
    }
    let app = App::connect(&config, Arc::new(LoginPrompt)).context("Failed to create client")?;

    let result = match cli.command {
        Commands::Feed { start } => browse_feed(&app, start).await,
        Commands::Show { index } => show_recipe(&app, index).await,
        Commands::Delete { index } => delete_recipe(&app, index).await,
        Commands::List => list_recipes(&app).await,
        Commands::Draft => show_draft(&app).await,
        Commands::Edit => edit_draft(&app).await,
        Commands::Set {
            name,
            description,
            rating,
            comment,
        } => set_fields(&app, name, description, rating, comment).await,
        Commands::Tag { action } => tag_draft(&app, action).await,
        Commands::Upload { files } => upload_files(&app, files).await,
        Commands::Unslot { position } => remove_media(&app, position).await,
    };

    app.teardown().await;
    result
}

/// Loads the feed. Returns false when there is nothing to show.
async fn load_feed(app: &App) -> Result<bool> {
    match app.open_feed().await {
        LoadOutcome::Loaded(_) => Ok(true),
        LoadOutcome::Redirected | LoadOutcome::Superseded => Ok(false),
        LoadOutcome::Failed(message) => bail!("Failed to fetch recipes: {}", message),
    }
}

async fn browse_feed(app: &App, start: usize) -> Result<()> {
    if !load_feed(app).await? {
        return Ok(());
    }

    let state = app.feed().state().await;
    if state.recipes.is_empty() {
        println!("📭 No recipes found.");
        return Ok(());
    }

    let mut index = start.min(state.recipes.len() - 1);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("\n{}", views::feed::render(&state, index));
        println!("⬆️  k / ⬇️  j to swipe, o to open, q to quit");

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "j" | "" if index + 1 < state.recipes.len() => index += 1,
            "k" if index > 0 => index -= 1,
            "o" => {
                let detail = app.open_detail(index).await?;
                println!("{}", views::detail::render(&detail));
            }
            "q" => break,
            _ => {}
        }
    }
    Ok(())
}

async fn show_recipe(app: &App, index: usize) -> Result<()> {
    if !load_feed(app).await? {
        return Ok(());
    }
    let detail = app.open_detail(index).await?;
    println!("{}", views::detail::render(&detail));
    Ok(())
}

async fn delete_recipe(app: &App, index: usize) -> Result<()> {
    if !load_feed(app).await? {
        return Ok(());
    }
    let recipe = app.delete_recipe(index).await?;

    println!("✅ Recipe deleted!");
    println!("   Name: {}", recipe.title());
    println!("   {} recipe(s) left", app.feed().state().await.recipes.len());
    Ok(())
}

async fn list_recipes(app: &App) -> Result<()> {
    if !load_feed(app).await? {
        return Ok(());
    }
    let state = app.feed().state().await;
    if state.recipes.is_empty() {
        println!("📭 No recipes found.");
        return Ok(());
    }

    println!("\n📋 Recipes ({})\n", state.recipes.len());
    views::list::table(&state.recipes).printstd();
    println!();
    Ok(())
}

async fn print_draft(app: &App) -> Result<()> {
    let draft = app
        .draft()
        .draft()
        .await
        .context("Draft has not been loaded")?;
    let buffer = app.autosave().buffer().await;
    let status = app.autosave().status().await;
    println!("{}", views::draft::render(&draft, &buffer, &status));
    Ok(())
}

async fn show_draft(app: &App) -> Result<()> {
    app.open_draft().await.context("Failed to fetch draft")?;
    print_draft(app).await
}

async fn edit_draft(app: &App) -> Result<()> {
    app.open_draft().await.context("Failed to fetch draft")?;
    print_draft(app).await?;

    println!("✏️  Commands: name <text>, desc <text>, tag <tag>, untag <tag>,");
    println!("   rate <0-5> [comment], show, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "name" => app.edit(FieldEdit::Name(rest.to_string())).await,
            "desc" => app.edit(FieldEdit::Content(Some(rest.to_string()))).await,
            "tag" => app.edit(FieldEdit::AddTag(rest.to_string())).await,
            "untag" => app.edit(FieldEdit::RemoveTag(rest.to_string())).await,
            "rate" => {
                let (value, comment) = rest.split_once(' ').unwrap_or((rest, ""));
                match parse_rating(value, comment) {
                    Ok(rating) => app.edit(FieldEdit::Rating(Some(rating))).await,
                    Err(e) => println!("⚠️  {}", e),
                }
            }
            "show" => print_draft(app).await?,
            "quit" | "q" => break,
            "" => app.autosave().blur().await,
            other => println!("⚠️  Unknown command: {}", other),
        }
    }

    app.flush().await;
    report_save(app).await
}

fn parse_rating(value: &str, comment: &str) -> Result<UserRating> {
    let rating: f64 = value
        .parse()
        .with_context(|| format!("Not a number: {}", value))?;
    let comment = (!comment.trim().is_empty()).then(|| comment.trim().to_string());
    Ok(UserRating::new(rating, comment)?)
}

async fn set_fields(
    app: &App,
    name: Option<String>,
    description: Option<String>,
    rating: Option<f64>,
    comment: Option<String>,
) -> Result<()> {
    app.open_draft().await.context("Failed to fetch draft")?;

    if let Some(name) = name {
        app.edit(FieldEdit::Name(name)).await;
    }
    if let Some(description) = description {
        app.edit(FieldEdit::Content(Some(description))).await;
    }
    match (rating, comment) {
        (Some(rating), comment) => {
            app.edit(FieldEdit::Rating(Some(UserRating::new(rating, comment)?)))
                .await
        }
        (None, Some(comment)) => {
            let current = app.autosave().buffer().await.user_rating;
            let rating = current.map(|r| r.rating).unwrap_or(0.0);
            app.edit(FieldEdit::Rating(Some(UserRating::new(rating, Some(comment))?)))
                .await
        }
        (None, None) => {}
    }

    app.flush().await;
    report_save(app).await
}

async fn tag_draft(app: &App, action: TagAction) -> Result<()> {
    app.open_draft().await.context("Failed to fetch draft")?;

    match action {
        TagAction::Add { tag } => app.edit(FieldEdit::AddTag(tag)).await,
        TagAction::Remove { tag } => {
            if !app.autosave().buffer().await.user_tags.contains(&tag) {
                bail!("Tag '{}' is not on the draft", tag);
            }
            app.edit(FieldEdit::RemoveTag(tag)).await
        }
    }

    app.flush().await;
    report_save(app).await
}

async fn report_save(app: &App) -> Result<()> {
    let status = app.autosave().status().await;
    if let Some(error) = status.last_error {
        bail!("Draft not saved: {}", error);
    }

    let buffer = app.autosave().buffer().await;
    println!("✅ Draft saved!");
    if !buffer.name.is_empty() {
        println!("   Name: {}", buffer.name);
    }
    if !buffer.user_tags.is_empty() {
        println!("   🏷️  Tags: {}", buffer.user_tags.join(", "));
    }
    Ok(())
}

async fn upload_files(app: &App, paths: Vec<String>) -> Result<()> {
    app.open_draft().await.context("Failed to fetch draft")?;

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        files.push(LocalFile::from_path(path).await?);
    }

    println!("⏳ Uploading {} file(s)...", files.len());
    let report = app.upload(files).await?;

    println!("✅ Uploaded {}/{} file(s)", report.succeeded(), report.uploads.len());
    for failed in report.failed() {
        if let Err(e) = &failed.result {
            println!("⚠️  {}: {}", failed.file_name, e);
        }
    }
    print_draft(app).await
}

async fn remove_media(app: &App, position: usize) -> Result<()> {
    app.open_draft().await.context("Failed to fetch draft")?;
    app.delete_media(position).await?;

    println!("✅ Picture removed");
    print_draft(app).await
}
