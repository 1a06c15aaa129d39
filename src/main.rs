//! scrollfeed-replay - Entry Point

use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing::{info, warn};

/// Replay a JSONL host-event script against the scrollfeed engine
#[derive(Parser, Debug)]
#[command(name = "scrollfeed-replay")]
#[command(version)]
#[command(about = "Replay a JSONL event script against the feed virtualization engine")]
pub struct Args {
    /// Path to JSONL replay script (reads from stdin if not provided)
    pub script: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Extra items mounted on each side of the visible range
    #[arg(short, long)]
    pub buffer: Option<usize>,

    /// Height in pixels assumed for unmeasured items
    #[arg(long)]
    pub estimated_height: Option<f64>,

    /// Path to log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = scrollfeed::config::load_config_with_precedence(args.config.clone())?;
        let merged = scrollfeed::config::merge_config(config_file);
        let with_env = scrollfeed::config::apply_env_overrides(merged);
        scrollfeed::config::apply_cli_overrides(
            with_env,
            args.estimated_height,
            args.buffer,
            args.log_file.clone(),
        )
    };

    scrollfeed::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let engine_config = config.engine_config()?;

    let (events, errors) = match &args.script {
        Some(path) => scrollfeed::replay::read_script(BufReader::new(File::open(path)?))?,
        None => scrollfeed::replay::read_script(io::stdin().lock())?,
    };

    for error in &errors {
        warn!(%error, "skipping malformed script line");
        eprintln!("{error}");
    }

    let mut replay = scrollfeed::replay::Replay::new(engine_config);
    let transcript = replay.run(&events);
    scrollfeed::replay::write_transcript(&transcript, io::stdout().lock())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["scrollfeed-replay", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["scrollfeed-replay", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["scrollfeed-replay"]);
        assert_eq!(args.script, None);
        assert_eq!(args.config, None);
        assert_eq!(args.buffer, None);
        assert_eq!(args.estimated_height, None);
        assert_eq!(args.log_file, None);
    }

    #[test]
    fn test_script_path_populates_script_field() {
        let args = Args::parse_from(["scrollfeed-replay", "session.jsonl"]);
        assert_eq!(args.script, Some(PathBuf::from("session.jsonl")));
    }

    #[test]
    fn test_buffer_short_and_long() {
        assert_eq!(Args::parse_from(["scrollfeed-replay", "-b", "5"]).buffer, Some(5));
        assert_eq!(
            Args::parse_from(["scrollfeed-replay", "--buffer", "0"]).buffer,
            Some(0)
        );
    }

    #[test]
    fn test_buffer_rejects_negative() {
        assert!(Args::try_parse_from(["scrollfeed-replay", "--buffer", "-1"]).is_err());
    }

    #[test]
    fn test_estimated_height_flag() {
        let args = Args::parse_from(["scrollfeed-replay", "--estimated-height", "64.5"]);
        assert_eq!(args.estimated_height, Some(64.5));
    }

    #[test]
    fn test_config_and_log_file_flags() {
        let args = Args::parse_from([
            "scrollfeed-replay",
            "--config",
            "/tmp/feed.toml",
            "--log-file",
            "/tmp/feed.log",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/feed.toml")));
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/feed.log")));
    }
}
