//! clipact binary - composition root.
//!
//! 1. Parse the CLI and load configuration from TOML
//! 2. Initialize tracing
//! 3. Open the action config store on the actions file
//! 4. Dispatch the subcommand (list, run, init, watch)

mod cli;
mod menu;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use clipact_action::{
    ActionConfigStore, ActionEngine, ConfigSource, ConfigWatcher, FileConfigSource,
};
use clipact_core::{ChannelHost, ClipactConfig, ContentEntry, HostEvent};
use tokio::io::AsyncReadExt;

use crate::cli::{CliArgs, Command};
use crate::menu::{render_menu, MenuAdapter, MenuItem};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();

    // Config is read before tracing exists so its log level can apply;
    // load problems are reported once the subscriber is up.
    let config_file = args.resolve_config_path();
    let loaded = ClipactConfig::load(&config_file);

    let level = args.resolve_log_level(loaded.as_ref().ok());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::debug!(path = %config_file.display(), error = %e, "Using default configuration");
            ClipactConfig::default()
        }
    };

    let actions_path = args.resolve_actions_path(&config);
    let source: Arc<dyn ConfigSource> = Arc::new(FileConfigSource::new(&actions_path));
    tracing::debug!(path = %actions_path.display(), "Actions file");

    match args.command {
        Command::List { content, json } => list(source, content, json).await,
        Command::Run { id, content } => run(source, &config, id, content).await,
        Command::Init => init(source, &config, &config_file).await,
        Command::Watch => watch(source, &config).await,
    }
}

async fn list(source: Arc<dyn ConfigSource>, content: Option<String>, json: bool) -> AppResult<()> {
    let items = menu_items(source, content).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        print!("{}", render_menu(&items));
    }
    Ok(())
}

/// The menu as `list` shows it, narrowed to `content` when given.
async fn menu_items(source: Arc<dyn ConfigSource>, content: Option<String>) -> Vec<MenuItem> {
    let store = Arc::new(ActionConfigStore::open(source, false).await);
    let mut adapter = MenuAdapter::new(store);
    adapter.set_entry(content.map(ContentEntry::new));
    adapter.items().to_vec()
}

async fn run(
    source: Arc<dyn ConfigSource>,
    config: &ClipactConfig,
    id: Option<String>,
    content: Option<String>,
) -> AppResult<()> {
    let content = match content {
        Some(content) => content,
        None => read_stdin().await?,
    };
    let entry = ContentEntry::new(content);

    let store = Arc::new(ActionConfigStore::open(source, false).await);
    let (host, mut events) = ChannelHost::new();
    let engine = ActionEngine::new(store, Arc::new(host), &config.engine);

    let applied = match id.as_deref() {
        Some(id) => engine.activate_action(&entry, id).await,
        None => engine.activate_default_action(&entry).await,
    };
    drop(engine);

    while let Some(event) = events.recv().await {
        match event {
            HostEvent::Copy(text) | HostEvent::Paste(text) => println!("{}", text),
            HostEvent::ShowQrCode(text) => eprintln!("QR code: {}", text),
            HostEvent::Error(message) => eprintln!("error: {}", message),
            HostEvent::ActionsChanged { .. } => {}
        }
    }

    if !applied {
        tracing::info!(kind = %entry.kind(), "No applicable action");
        std::process::exit(1);
    }
    Ok(())
}

/// Clipboard text piped on stdin, without the trailing newline shells add.
async fn read_stdin() -> AppResult<String> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}

async fn init(
    source: Arc<dyn ConfigSource>,
    config: &ClipactConfig,
    config_file: &Path,
) -> AppResult<()> {
    if !config_file.exists() {
        config.save(config_file)?;
    }
    let actions = ActionConfigStore::load(source.as_ref(), true).await;
    println!(
        "{} actions in {}",
        actions.len(),
        source.describe()
    );
    Ok(())
}

async fn watch(source: Arc<dyn ConfigSource>, config: &ClipactConfig) -> AppResult<()> {
    let store = Arc::new(ActionConfigStore::open(source, config.actions.persist_defaults).await);
    let mut adapter = MenuAdapter::new(Arc::clone(&store));
    tracing::info!(items = adapter.items().len(), "Menu ready");

    if !config.watch.enabled {
        tracing::warn!("Watching is disabled in config; nothing to do");
        return Ok(());
    }

    let watcher = Arc::new(ConfigWatcher::new(
        Arc::clone(&store),
        config.watch.poll_interval(),
    ));
    let handle = {
        let watcher = Arc::clone(&watcher);
        tokio::spawn(async move { watcher.run().await })
    };
    if adapter.sync() {
        tracing::info!(items = adapter.items().len(), "Menu caught up with pending changes");
    }

    loop {
        tokio::select! {
            change = adapter.next_change() => match change {
                Some(generation) => {
                    tracing::info!(generation, items = adapter.items().len(), "Menu rebuilt");
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    watcher.shutdown();
    handle.await?;
    Ok(())
}
