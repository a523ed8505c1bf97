use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use comicshelf_application::Navigator;
use comicshelf_storage::Storage;
use comicshelf_ui::{TerminalView, Ui};
use directories::{ProjectDirs, UserDirs};
use log::info;

const STATE_PATH_ENV: &str = "COMICSHELF_STATE_PATH";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dirs =
        ProjectDirs::from("dev", "xiey", "comicshelf").context("resolve project dirs")?;

    let config_dir = project_dirs.config_dir();
    fs::create_dir_all(config_dir)
        .with_context(|| format!("create config dir {}", config_dir.display()))?;
    init_logging(config_dir)?;

    let state_path = state_path(config_dir);
    if let Some(parent) = state_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create state dir {}", parent.display()))?;
    }
    info!("state file {}", state_path.display());

    let mut storage = Storage::open(&state_path);
    storage.seed_history(&default_folder()?.to_string_lossy());

    let start = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| storage.history().first().map(PathBuf::from));

    let mut navigator = Navigator::new(storage, TerminalView::new());
    if let Some(folder) = start {
        navigator.open_folder(&folder);
    }

    Ui::new(navigator).run()
}

/// Logs go to a file so they never draw over the terminal UI.
fn init_logging(config_dir: &Path) -> anyhow::Result<()> {
    let log_path = config_dir.join("comicshelf.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open log file {}", log_path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("install logger")?;
    Ok(())
}

fn state_path(config_dir: &Path) -> PathBuf {
    std::env::var_os(STATE_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir.join("settings.json"))
}

fn default_folder() -> anyhow::Result<PathBuf> {
    match UserDirs::new() {
        Some(dirs) => Ok(dirs.home_dir().to_path_buf()),
        None => std::env::current_dir().context("get cwd"),
    }
}
