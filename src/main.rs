use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use autofix_catalog::config::Config;
use autofix_catalog::forum::ForumScraper;
use autofix_catalog::logging;
use autofix_catalog::render::{console_renderer, RenderHookSlot};
use autofix_catalog::source::{CatalogSource, FileCatalogSource, HttpCatalogSource};
use autofix_catalog::{store, CatalogLoader, LoadOutcome, ProblemsSlot, PROBLEMS};

#[derive(Parser)]
#[command(name = "autofix_catalog")]
#[command(about = "Vehicle problem catalog loader and forum scraper")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the catalog from its JSON resource and render it
    Load {
        /// Catalog URL (defaults to catalog.url from config)
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,
        /// Read the catalog from a local JSON file instead
        #[arg(long)]
        file: Option<PathBuf>,
        /// Read the catalog from catalog.path in config
        #[arg(long, conflicts_with_all = ["url", "file"])]
        local: bool,
    },
    /// Publish the embedded catalog and print it
    Inline,
    /// Scrape the forum, merge with the existing catalog and save it
    Scrape {
        /// Directory for problems.json (defaults to output.data_dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory for problems.js (defaults to output.js_dir)
        #[arg(long)]
        js_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Load { url, file, local } => {
            let file = if local { Some(config.catalog.path.clone()) } else { file };
            let source: Arc<dyn CatalogSource> = match file {
                Some(path) => Arc::new(FileCatalogSource::new(path)),
                None => Arc::new(HttpCatalogSource::with_timeout(
                    url.unwrap_or_else(|| config.catalog.url.clone()),
                    Duration::from_secs(config.catalog.timeout_seconds),
                )?),
            };
            println!("🔄 Loading catalog from {}...", source.name());

            let hooks = RenderHookSlot::with_hook(console_renderer);
            let handle = CatalogLoader::remote(ProblemsSlot::clone(&PROBLEMS), source, hooks).spawn();
            info!("Catalog slot holds {} records while loading", PROBLEMS.len());

            match handle.await? {
                LoadOutcome::Loaded { count, .. } => println!("✅ Loaded {count} problem records"),
                LoadOutcome::Failed => println!("❌ Catalog load failed, see logs"),
                LoadOutcome::Superseded => warn!("Load superseded by a newer one"),
            }
        }
        Commands::Inline => {
            let outcome = CatalogLoader::inline(ProblemsSlot::clone(&PROBLEMS)).load().await;
            info!(?outcome, "Inline catalog published");
            console_renderer(PROBLEMS.snapshot().to_vec());
        }
        Commands::Scrape { data_dir, js_dir } => {
            let mut output = config.output.clone();
            if let Some(dir) = data_dir {
                output.data_dir = dir;
            }
            if let Some(dir) = js_dir {
                output.js_dir = dir;
            }
            let json_path = output.json_path();
            let js_path = output.js_path();

            println!("📡 Scraping {}...", config.scraper.forum_url);
            let scraper = ForumScraper::new(config.scraper.clone())?;
            let new = match scraper.scrape().await {
                Ok(records) => records,
                Err(e) => {
                    error!("Forum scrape failed: {}", e);
                    return Err(e.into());
                }
            };

            let existing = store::load_existing(&json_path).await?;
            let new_count = new.len();
            let combined = store::merge(new, existing)?;
            let total = store::save(combined, &json_path, &js_path).await?;

            println!("✅ Added/updated {new_count} problem records. Total: {total}");
            println!("   JSON: {}", json_path.display());
            println!("   JS:   {}", js_path.display());
        }
    }

    Ok(())
}
