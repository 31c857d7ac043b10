use std::path::{Path, PathBuf};

use mercato_toasts::bridge::import_server_alerts;
use mercato_toasts::config::Config;
use mercato_toasts::error::ImportError;
use mercato_toasts::surface::MemoryPage;
use mercato_toasts::telemetry::init_tracing;
use mercato_toasts::{LifecycleEvent, NotificationManager, Phase, Result};
use tokio::signal;
use tokio::time::sleep;
use tracing::{info, warn};

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "toasts.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::from_env_and_file(&config_path)?;

    let page = match cli.page.as_deref() {
        Some(path) => load_page(path)?,
        None => MemoryPage::new(),
    };
    let manager = NotificationManager::new(page.clone(), &config)?;
    let events = manager.subscribe();

    let mut handles = import_server_alerts(&manager)?;
    for (kind, message) in cli.shows {
        handles.push(manager.show(message, kind, cli.duration)?);
    }
    if handles.is_empty() {
        info!("nothing to show");
        return Ok(());
    }
    info!(count = handles.len(), "notifications posted");

    let close_after = cli.close_after;
    let clicks = async move {
        match close_after {
            Some(delay) => sleep(delay).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(clicks);
    let mut clicked = false;

    loop {
        tokio::select! {
            biased;
            _ = signal::ctrl_c() => {
                info!("shutdown signal received, leaving notifications in place");
                break;
            }
            () = &mut clicks, if !clicked => {
                clicked = true;
                let started = handles.iter().filter(|handle| manager.dismiss(handle)).count();
                info!(started, "close controls clicked");
            }
            event = events.recv() => {
                let Ok(event) = event else { break };
                print_event(&event);
                if event.phase == Phase::Removed && manager.is_empty() {
                    break;
                }
            }
        }
    }

    if let Some(markup) = page.render() {
        println!("{markup}");
    }
    Ok(())
}

fn load_page(path: &Path) -> Result<MemoryPage> {
    let markup = std::fs::read_to_string(path).map_err(|source| ImportError::PageRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(MemoryPage::from_markup(&markup)?)
}

fn print_event(event: &LifecycleEvent) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(err) => warn!(error = %err, id = %event.id, "failed to encode lifecycle event"),
    }
}
