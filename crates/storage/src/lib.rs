//! JSON-backed persistence for reading progress, folder history and preferences.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use comicshelf_core::{Error, HISTORY_LIMIT, Preferences, Result};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

/// Everything kept in the state file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    /// Archive path -> last displayed page index.
    pub progress: BTreeMap<String, usize>,
    /// Most recently used folder first.
    pub history: Vec<String>,
    pub settings: Preferences,
}

#[derive(Serialize)]
struct Document<'a> {
    progress: &'a BTreeMap<String, usize>,
    history: &'a [String],
    settings: &'a Preferences,
}

#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    state: PersistedState,
}

impl Storage {
    /// Loads the state file at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = load(&path);
        Self { path, state }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Preferences {
        &self.state.settings
    }

    pub fn history(&self) -> &[String] {
        &self.state.history
    }

    pub fn progress(&self, archive: &str) -> Option<usize> {
        self.state.progress.get(archive).copied()
    }

    /// Writes the whole document, replacing the previous file.
    pub fn save(&self) -> Result<()> {
        let document = Document {
            progress: &self.state.progress,
            history: &self.state.history,
            settings: &self.state.settings,
        };
        let persistence = |source: std::io::Error| Error::Persistence {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|err| persistence(std::io::Error::other(err)))?;
        fs::write(&self.path, json).map_err(persistence)?;
        debug!("saved state to {}", self.path.display());
        Ok(())
    }

    /// Upserts the page index for `archive` and saves.
    ///
    /// The in-memory record is updated even when the save fails.
    pub fn record_progress(&mut self, archive: &str, index: usize) -> Result<()> {
        self.state.progress.insert(archive.to_string(), index);
        self.save()
    }

    /// Moves `folder` to the front of the history and saves.
    pub fn touch_folder(&mut self, folder: &str) -> Result<()> {
        push_front_unique(&mut self.state.history, folder);
        self.save()
    }

    pub fn update_settings(&mut self, update: impl FnOnce(&mut Preferences)) -> Result<()> {
        update(&mut self.state.settings);
        self.save()
    }

    /// Adds a starting folder when the history is empty. Not saved until the next write.
    pub fn seed_history(&mut self, folder: &str) {
        if self.state.history.is_empty() {
            self.state.history.push(folder.to_string());
        }
    }
}

fn push_front_unique(history: &mut Vec<String>, folder: &str) {
    history.retain(|existing| existing != folder);
    history.insert(0, folder.to_string());
    history.truncate(HISTORY_LIMIT);
}

/// Reads the state file; any failure yields the empty default state.
pub fn load(path: &Path) -> PersistedState {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!("no state at {}: {err}", path.display());
            return PersistedState::default();
        }
    };
    match parse_document(&text) {
        Some(state) => state,
        None => {
            warn!("ignoring unparseable state file {}", path.display());
            PersistedState::default()
        }
    }
}

/// Field-by-field merge onto defaults: a bad value only loses that value.
fn parse_document(text: &str) -> Option<PersistedState> {
    let Value::Object(root) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    let mut state = PersistedState::default();

    if let Some(Value::Object(progress)) = root.get("progress") {
        for (path, index) in progress {
            match index.as_u64().and_then(|i| usize::try_from(i).ok()) {
                Some(index) => {
                    state.progress.insert(path.clone(), index);
                }
                None => debug!("dropping progress for {path}: {index}"),
            }
        }
    }

    if let Some(Value::Array(history)) = root.get("history") {
        for folder in history.iter().filter_map(Value::as_str) {
            if !state.history.iter().any(|f| f == folder) {
                state.history.push(folder.to_string());
            }
        }
        state.history.truncate(HISTORY_LIMIT);
    }

    if let Some(Value::Object(settings)) = root.get("settings") {
        merge_settings(&mut state.settings, settings);
    }

    Some(state)
}

fn merge_settings(prefs: &mut Preferences, settings: &Map<String, Value>) {
    if let Some(enabled) = settings.get("is_animation_enabled").and_then(Value::as_bool) {
        prefs.animation_enabled = enabled;
    }
    if let Some(direction) = settings
        .get("page_turn_direction")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
    {
        prefs.page_turn_direction = direction;
    }
    if let Some(key) = settings
        .get("sort_key")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
    {
        prefs.sort_key = key;
    }
    if let Some(descending) = settings.get("sort_reverse").and_then(Value::as_bool) {
        prefs.sort_descending = descending;
    }
}
