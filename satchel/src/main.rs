use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use satchel::config::ManagerConfig;
use satchel::fs::dedup;
use satchel::fs::entry::{Entry, LocalEntry, RemoteEntry};
use satchel::opener::Opener;
use satchel::opener::viewer::SystemLauncher;
use satchel::prefs::PrefStore;
use satchel::ui::ConsoleDialogs;
use satchel_core::{DriveClient, ResourceType};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CliMode {
    Open { target: String, open_as: bool },
    Unique { target: String, dir: bool },
    Prefs(PrefsAction),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PrefsAction {
    Show,
    Sort(i64),
    Filter(Option<String>),
    Hidden(bool),
}

fn parse_cli_mode<I>(args: I) -> anyhow::Result<CliMode>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().skip(1);
    let Some(command) = args.next() else {
        return Ok(CliMode::Help);
    };
    match command.as_str() {
        "open" => {
            let mut target = None;
            let mut open_as = false;
            for arg in args {
                match arg.as_str() {
                    "--as" => open_as = true,
                    other if target.is_none() && !other.starts_with('-') => {
                        target = Some(other.to_string());
                    }
                    other => anyhow::bail!("unknown argument: {other}"),
                }
            }
            let target = target.context("open requires a path")?;
            Ok(CliMode::Open { target, open_as })
        }
        "unique" => {
            let mut target = None;
            let mut dir = false;
            for arg in args {
                match arg.as_str() {
                    "--dir" => dir = true,
                    other if target.is_none() && !other.starts_with('-') => {
                        target = Some(other.to_string());
                    }
                    other => anyhow::bail!("unknown argument: {other}"),
                }
            }
            let target = target.context("unique requires a path")?;
            Ok(CliMode::Unique { target, dir })
        }
        "prefs" => {
            let action = match args.next().as_deref() {
                None => PrefsAction::Show,
                Some("sort") => {
                    let mode = args.next().context("sort requires a mode number")?;
                    PrefsAction::Sort(mode.parse().context("sort mode must be an integer")?)
                }
                Some("filter") => {
                    let value = args.next().context("filter requires a value or 'none'")?;
                    PrefsAction::Filter((value != "none").then_some(value))
                }
                Some("hidden") => match args.next().as_deref() {
                    Some("on") => PrefsAction::Hidden(true),
                    Some("off") => PrefsAction::Hidden(false),
                    _ => anyhow::bail!("hidden requires on or off"),
                },
                Some(other) => anyhow::bail!("unknown prefs action: {other}"),
            };
            Ok(CliMode::Prefs(action))
        }
        "--help" | "-h" | "help" => Ok(CliMode::Help),
        other => anyhow::bail!("unknown command: {other}"),
    }
}

fn print_usage() {
    println!("Usage: satchel <command> [args]");
    println!();
    println!("Commands:");
    println!("  open <path> [--as]     open a file with the platform viewer;");
    println!("                         remote:<path> fetches from the drive first,");
    println!("                         --as always asks which kind of application to use");
    println!("  unique <path> [--dir]  print a collision-free name for a new entry");
    println!("  prefs                  show listing preferences");
    println!("  prefs sort <n>         set the sort mode");
    println!("  prefs filter <v|none>  set or clear the listing filter");
    println!("  prefs hidden <on|off>  toggle hidden entries");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn build_client(config: &ManagerConfig) -> anyhow::Result<DriveClient> {
    let token = std::env::var("SATCHEL_TOKEN").context("SATCHEL_TOKEN is not set")?;
    Ok(match config.api_base_url.as_deref() {
        Some(url) => DriveClient::with_base_url(url, token)?,
        None => DriveClient::new(token)?,
    })
}

/// `remote:<path>` selects the drive; anything else is a local path. `dir`
/// is only meaningful for entries that may not exist yet.
fn entry_for_target(
    config: &ManagerConfig,
    target: &str,
    dir: bool,
) -> anyhow::Result<Entry> {
    if let Some(remote_path) = target.strip_prefix("remote:") {
        let client = build_client(config)?;
        Ok(Entry::Remote(RemoteEntry::new(client, remote_path, dir)))
    } else {
        Ok(Entry::Local(LocalEntry::new(PathBuf::from(target), dir)))
    }
}

async fn run_open(config: &ManagerConfig, target: &str, open_as: bool) -> anyhow::Result<()> {
    let entry = if let Some(remote_path) = target.strip_prefix("remote:") {
        let client = build_client(config)?;
        let resource = client
            .stat(remote_path)
            .await
            .with_context(|| format!("failed to stat {remote_path}"))?;
        if resource.resource_type == ResourceType::Dir {
            anyhow::bail!("{remote_path} is a directory");
        }
        let mut item = RemoteEntry::new(client, resource.path, false);
        if let Some(size) = resource.size {
            item = item.with_size(size);
        }
        Entry::Remote(item)
    } else {
        let path = PathBuf::from(target);
        let dir = path.is_dir();
        Entry::Local(LocalEntry::new(path, dir))
    };

    let opener = Opener::new(
        config.download_root.clone(),
        Arc::new(ConsoleDialogs),
        Arc::new(SystemLauncher),
    );
    opener.open(&entry, open_as).await?;
    Ok(())
}

async fn run_unique(config: &ManagerConfig, target: &str, dir: bool) -> anyhow::Result<()> {
    let candidate = entry_for_target(config, target, dir)?;
    let resolved = dedup::resolve_unique(&candidate).await?;
    println!("{}", resolved.location());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    match parse_cli_mode(std::env::args())? {
        CliMode::Help => {
            print_usage();
            Ok(())
        }
        CliMode::Open { target, open_as } => {
            let config = ManagerConfig::from_env()?;
            run_open(&config, &target, open_as).await
        }
        CliMode::Unique { target, dir } => {
            let config = ManagerConfig::from_env()?;
            run_unique(&config, &target, dir).await
        }
        CliMode::Prefs(action) => {
            let store = PrefStore::open_default()?;
            match action {
                PrefsAction::Show => {
                    println!("sort mode:   {}", store.sort_mode());
                    println!(
                        "filter:      {}",
                        store.filter().as_deref().unwrap_or("(none)")
                    );
                    println!("show hidden: {}", store.show_hidden());
                }
                PrefsAction::Sort(mode) => store.set_sort_mode(mode)?,
                PrefsAction::Filter(value) => store.set_filter(value.as_deref())?,
                PrefsAction::Hidden(show) => store.set_show_hidden(show)?,
            }
            Ok(())
        }
    }
}
