use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;
use mercato_toasts::Kind;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay site notifications in a headless page", long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server-rendered page whose `role="alert"` messages are imported first.
    #[arg(long, value_name = "FILE")]
    pub page: Option<PathBuf>,

    /// Notification to show, as `KIND=MESSAGE` (e.g. "success=Booking confirmed").
    #[arg(long = "show", value_name = "KIND=MESSAGE", value_parser = parse_show)]
    pub shows: Vec<(Kind, String)>,

    /// Display time for `--show` notifications (e.g. "3s"; "0s" keeps them).
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Clicks every close control after this delay.
    #[arg(long, value_parser = parse_duration)]
    pub close_after: Option<Duration>,

    /// JSON log output (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "mercato_toasts=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Text without a known `KIND=` prefix is shown whole, as info.
fn parse_show(raw: &str) -> Result<(Kind, String), String> {
    let labelled = raw.split_once('=').and_then(|(label, message)| {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(label.trim()))
            .map(|kind| (kind, message))
    });
    let (kind, message) = labelled.unwrap_or((Kind::Info, raw));
    if message.trim().is_empty() {
        return Err("notification message cannot be empty".to_string());
    }
    Ok((kind, message.to_string()))
}
