//! sitecache - command-line companion for the marketing site content cache.
//!
//! Loads the cached site content the same way the public site does (cache
//! first, background refresh when aging) and prints it, or forces a refresh.

use std::io::{self, BufRead};
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use sitecache_core::auth::CredentialStore;
use sitecache_core::cache::now_millis;
use sitecache_core::{
    ApiClient, CacheState, CacheStatus, Config, ContentCacheManager, FileStore, Initialization,
    Section,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type Manager = ContentCacheManager<ApiClient, FileStore>;

const USAGE: &str = "\
Usage: sitecache [COMMAND]

Commands:
  status                 Show cache status and record counts (default)
  show <section> [--json] Print one section: projects, services, team, blog-posts
  refresh                Refetch all content now
  clear                  Remove the cached content from disk
  set-key                Read an API key from stdin and store it in the keychain
";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and to a daily file under the cache directory. The
/// returned guard must live until exit so buffered file logs are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "sitecache.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let log_dir = config.cache_dir().ok().map(|dir| dir.join("logs"));
    let _guard = init_tracing(log_dir.as_deref());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");

    match command {
        "status" => status(&build_manager(&config)?).await,
        "show" => {
            let section: Section = args
                .get(1)
                .ok_or_else(|| anyhow!("show needs a section\n\n{}", USAGE))?
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let json = args.iter().any(|a| a == "--json");
            show(&build_manager(&config)?, section, json).await
        }
        "refresh" => refresh(&build_manager(&config)?).await,
        "clear" => {
            build_manager(&config)?.clear()?;
            println!("Cached content removed.");
            Ok(())
        }
        "set-key" => set_key(&config),
        "-h" | "--help" | "help" => {
            print!("{}", USAGE);
            Ok(())
        }
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

fn build_manager(config: &Config) -> Result<Manager> {
    let api = ApiClient::new(config.project_url()?, &config.api_key()?)?;
    let store = FileStore::new(config.cache_dir()?)?;
    Ok(ContentCacheManager::new(api, store, config.cache_policy()))
}

/// Initialize the manager and let any background refresh finish before exit.
async fn load(manager: &Manager) -> Result<()> {
    match manager.initialize().await {
        Initialization::Cached { background } => {
            info!("Content served from cache");
            if let Some(handle) = background {
                eprintln!("Cached content is aging, refreshing in background...");
                if let Err(e) = handle.await {
                    warn!(error = %e, "Background refresh task ended abnormally");
                }
            }
            Ok(())
        }
        Initialization::Fetched => Ok(()),
        Initialization::Failed(e) => Err(e.into()),
    }
}

async fn status(manager: &Manager) -> Result<()> {
    load(manager).await?;
    print_status(&manager.state());
    Ok(())
}

fn print_status(state: &CacheState) {
    let status = match state.status {
        CacheStatus::Uninitialized => "uninitialized",
        CacheStatus::Loading => "loading",
        CacheStatus::Ready => "ready",
        CacheStatus::Error => "error",
    };
    println!("Status:      {}", status);

    match state.content.as_deref() {
        Some(content) => {
            let now = now_millis();
            println!("Updated:     {}", content.age_display(now));
            for section in Section::ALL {
                let marker = if state.is_data_ready(Some(section)) { "" } else { "  (empty)" };
                println!("{:<12} {}{}", format!("{}:", section), section.len_in(content), marker);
            }
        }
        None => println!("Updated:     never"),
    }

    if let Some(ref error) = state.error {
        println!("Error:       {}", error);
    }
}

async fn show(manager: &Manager, section: Section, json: bool) -> Result<()> {
    load(manager).await?;
    let state = manager.state();

    if json {
        let value = match section {
            Section::Projects => serde_json::to_value(state.projects().items())?,
            Section::Services => serde_json::to_value(state.services().items())?,
            Section::Team => serde_json::to_value(state.team().items())?,
            Section::BlogPosts => serde_json::to_value(state.blog_posts().items())?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let lines: Vec<String> = match section {
        Section::Projects => state
            .projects()
            .items()
            .iter()
            .map(|p| format!("{:<6} {:<32} {:<16} {}", p.id, p.title, p.category, p.tech_display()))
            .collect(),
        Section::Services => state
            .services()
            .items()
            .iter()
            .map(|s| format!("{:<6} {:<32} {}", s.id, s.title, s.price.as_deref().unwrap_or("")))
            .collect(),
        Section::Team => state
            .team()
            .items()
            .iter()
            .map(|m| format!("{:<6} {:<28} {}", m.id, m.name, m.role))
            .collect(),
        Section::BlogPosts => state
            .blog_posts()
            .items()
            .iter()
            .map(|b| format!("{:<6} {:<40} {:<20} {}", b.id, b.title, b.author, b.read_time_display()))
            .collect(),
    };

    if lines.is_empty() {
        println!("No {} cached.", section);
    } else {
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(())
}

async fn refresh(manager: &Manager) -> Result<()> {
    let content = manager.refresh_data().await?;
    println!(
        "Refreshed {} records ({} projects, {} services, {} team, {} blog posts).",
        content.record_count(),
        content.projects.len(),
        content.services.len(),
        content.team.len(),
        content.blog_posts.len()
    );
    Ok(())
}

fn set_key(config: &Config) -> Result<()> {
    let url = config.project_url()?;
    eprintln!("Paste the API key for {} and press Enter:", url);
    let mut key = String::new();
    io::stdin().lock().read_line(&mut key)?;
    let key = key.trim();
    if key.is_empty() {
        bail!("No API key given");
    }
    CredentialStore::store_api_key(url, key)?;
    println!("API key stored in the system keychain.");
    Ok(())
}
