use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chatform_engine::{FlowManager, parse_form_file};
use chatform_util::{InputConfig, config_home};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Conversational forms in the terminal.
#[derive(Debug, Parser)]
#[command(name = "chatform", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask the questions of a form and print the answers as JSON.
    Run {
        /// Form definition (YAML, or JSON by extension).
        file: PathBuf,
        /// Input configuration file; defaults to the chatform config directory.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Where diagnostics are written while the terminal UI is active.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Validate a form definition without running it.
    Check {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { file, config, log_file } => {
            let log_file = log_file.unwrap_or_else(|| config_home().join("chatform.log"));
            init_tracing(&log_file)?;
            run_form(&file, config.as_deref()).await
        }
        Command::Check { file } => check_form(&file),
    }
}

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_tracing(log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("open log file {}", log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| anyhow!("install tracing subscriber: {error}"))
}

async fn run_form(file: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = InputConfig::load(config_path).context("load input configuration")?;
    let manager = load_manager(file)?;
    info!(form = %file.display(), "starting form");
    let answers = chatform_tui::run(manager, config).await?;
    println!("{}", serde_json::to_string_pretty(&answers)?);
    Ok(())
}

fn check_form(file: &Path) -> Result<()> {
    let manager = load_manager(file)?;
    let name = manager.title().map_or_else(|| file.display().to_string(), str::to_string);
    println!("{name}: ok ({} questions)", manager.question_count());
    Ok(())
}

fn load_manager(file: &Path) -> Result<FlowManager> {
    let definition = parse_form_file(file)?;
    FlowManager::new(definition).with_context(|| format!("invalid form {}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_config_and_log_file() {
        let cli = Cli::try_parse_from(["chatform", "run", "form.yaml", "--config", "c.json", "--log-file", "out.log"])
            .expect("parse");
        match cli.command {
            Command::Run { file, config, log_file } => {
                assert_eq!(file, PathBuf::from("form.yaml"));
                assert_eq!(config, Some(PathBuf::from("c.json")));
                assert_eq!(log_file, Some(PathBuf::from("out.log")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn second_tracing_install_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log_file = dir.path().join("logs").join("chatform.log");
        init_tracing(&log_file).expect("first install");
        assert!(log_file.exists());

        let error = init_tracing(&log_file).expect_err("subscriber already installed");
        assert!(error.to_string().starts_with("install tracing subscriber"));
    }

    #[test]
    fn check_rejects_duplicate_names() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("form.yaml");
        fs::write(
            &path,
            "tags:\n  - name: a\n    type: text\n  - name: a\n    type: text\n",
        )
        .expect("write form");
        let error = check_form(&path).expect_err("duplicate names");
        assert!(format!("{error:#}").contains("duplicate question name 'a'"));
    }

    #[test]
    fn check_accepts_a_valid_form() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("form.json");
        fs::write(&path, r#"{"title":"Signup","tags":[{"name":"email","type":"text"}]}"#).expect("write form");
        assert!(check_form(&path).is_ok());
    }
}
