//! EarTrumpet Actions command line
//!
//! Inspects, validates and imports rule files. Logs go to stderr and are
//! filtered by `EA_LOG` (falling back to `log_filter` in `actions.yaml`,
//! then `info`).

use anyhow::{bail, Context, Result};
use ea_config::{load_rules, resolve_config_dir, Settings};
use ea_rules::{RuleConfig, RuleManager, RuleStore, Storage};
use ea_triggers::{TriggerKind, BASE_TYPE_NAME, OPTIONS_BASE_TYPE_NAME};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV: &str = "EA_LOG";

const USAGE: &str = "\
usage: eartrumpet-actions [--config <dir>] <command>

commands:
  kinds            list the registered trigger kinds
  check <file>     validate a rules file
  list             list stored rules
  import <file>    validate a rules file and replace the stored rules with it
  export           print stored rules as YAML";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Kinds,
    Check(PathBuf),
    List,
    Import(PathBuf),
    Export,
}

#[derive(Debug, PartialEq, Eq)]
struct Cli {
    config_dir: Option<PathBuf>,
    command: Command,
}

fn parse_args<I>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_dir = None;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let dir = args.next().context("--config needs a directory")?;
                config_dir = Some(PathBuf::from(dir));
            }
            "--help" | "-h" => bail!("{}", USAGE),
            flag if flag.starts_with('-') => bail!("unknown flag {}\n\n{}", flag, USAGE),
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("kinds") => Command::Kinds,
        Some("list") => Command::List,
        Some("export") => Command::Export,
        Some("check") => Command::Check(file_arg(positional.next(), "check")?),
        Some("import") => Command::Import(file_arg(positional.next(), "import")?),
        Some(other) => bail!("unknown command {}\n\n{}", other, USAGE),
        None => bail!("{}", USAGE),
    };

    if let Some(extra) = positional.next() {
        bail!("unexpected argument {}\n\n{}", extra, USAGE);
    }

    Ok(Cli {
        config_dir,
        command,
    })
}

fn file_arg(arg: Option<String>, command: &str) -> Result<PathBuf> {
    arg.map(PathBuf::from)
        .with_context(|| format!("{} needs a rules file\n\n{}", command, USAGE))
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Load rule configs into a fresh manager and collect every problem found
fn check_rules(configs: Vec<RuleConfig>) -> Result<(RuleManager, Vec<String>)> {
    let manager = RuleManager::new();
    manager.load(configs)?;

    let mut problems: Vec<String> = manager
        .validate_all()
        .into_iter()
        .map(|e| e.to_string())
        .collect();

    for conflict in manager.hotkey_conflicts() {
        problems.push(format!(
            "hotkey {} is bound by several rules: {}",
            conflict.hotkey,
            conflict.rule_ids.join(", ")
        ));
    }

    Ok((manager, problems))
}

fn print_rules(manager: &RuleManager) {
    for rule in manager.all() {
        let state = if rule.enabled { "enabled" } else { "disabled" };
        println!("{} ({}) [{}]", rule.display_name(), rule.id, state);
        for trigger in &rule.triggers {
            println!("  - {}: {}", trigger.type_name(), trigger);
        }
    }
}

fn load_checked(config_dir: &Path, file: &Path) -> Result<RuleManager> {
    let file = std::env::current_dir()?.join(file);
    let configs = load_rules(config_dir, &file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    let (manager, problems) = check_rules(configs)?;

    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("error: {}", problem);
        }
        bail!("{} problem(s) in {}", problems.len(), file.display());
    }
    Ok(manager)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args(std::env::args().skip(1))?;
    let config_dir = resolve_config_dir(cli.config_dir);
    let settings = Settings::load(&config_dir)
        .with_context(|| format!("failed to load settings from {}", config_dir.display()))?;

    init_tracing(settings.log_filter.as_deref().unwrap_or("info"))?;
    info!("Using config directory {}", config_dir.display());

    let store = RuleStore::new(Storage::new(&config_dir));

    match cli.command {
        Command::Kinds => {
            println!("{} ({})", BASE_TYPE_NAME, OPTIONS_BASE_TYPE_NAME);
            for kind in TriggerKind::ALL {
                println!("  {:<14}{}", kind.as_str(), kind.type_name());
            }
        }
        Command::Check(file) => {
            let manager = load_checked(&config_dir, &file)?;
            print_rules(&manager);
            println!("{} rule(s) OK", manager.count());
        }
        Command::List => {
            let manager = RuleManager::new();
            store.load_into(&manager).await?;
            print_rules(&manager);
        }
        Command::Import(file) => {
            let manager = load_checked(&config_dir, &file)?;
            if settings.persist {
                store.save_from(&manager).await?;
                println!("Imported {} rule(s)", manager.count());
            } else {
                warn!("Persistence is disabled in settings, nothing was written");
            }
        }
        Command::Export => {
            let manager = RuleManager::new();
            store.load_into(&manager).await?;
            let configs: Vec<RuleConfig> = manager.all().iter().map(|r| r.to_config()).collect();
            print!("{}", serde_yaml::to_string(&configs)?);
        }
    }

    Ok(())
}
