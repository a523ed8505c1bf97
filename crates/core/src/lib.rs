//! Core domain types for Comicshelf.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

mod error;

pub use error::{Error, Result};

/// Recognized archive suffixes, matched case-insensitively.
pub const ARCHIVE_SUFFIXES: &[&str] = &[".zip", ".cbz"];

/// Recognized page image suffixes, matched case-insensitively.
pub const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

pub const HISTORY_LIMIT: usize = 10;

pub fn has_suffix(name: &str, suffixes: &[&str]) -> bool {
    let lower = name.to_lowercase();
    suffixes.iter().any(|suffix| lower.ends_with(suffix))
}

pub fn is_archive_name(name: &str) -> bool {
    has_suffix(name, ARCHIVE_SUFFIXES)
}

pub fn is_image_name(name: &str) -> bool {
    has_suffix(name, IMAGE_SUFFIXES)
}

/// Key used for progress records and folder history.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// File name with its extension stripped.
pub fn book_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "untitled".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preferences {
    #[serde(rename = "is_animation_enabled")]
    pub animation_enabled: bool,
    pub page_turn_direction: TurnDirection,
    pub sort_key: SortKey,
    #[serde(rename = "sort_reverse")]
    pub sort_descending: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            animation_enabled: false,
            page_turn_direction: TurnDirection::ForwardOnLeft,
            sort_key: SortKey::Name,
            sort_descending: false,
        }
    }
}

impl Preferences {
    /// Picking a different key starts over in ascending order.
    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
        self.sort_descending = false;
    }

    pub fn cycle_sort_key(&mut self) {
        let next = match self.sort_key {
            SortKey::Name => SortKey::Date,
            SortKey::Date => SortKey::Size,
            SortKey::Size => SortKey::Name,
        };
        self.set_sort_key(next);
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_descending = !self.sort_descending;
    }

    pub fn toggle_animation(&mut self) {
        self.animation_enabled = !self.animation_enabled;
    }

    pub fn toggle_turn_direction(&mut self) {
        self.page_turn_direction = match self.page_turn_direction {
            TurnDirection::ForwardOnLeft => TurnDirection::ForwardOnRight,
            TurnDirection::ForwardOnRight => TurnDirection::ForwardOnLeft,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnDirection {
    /// Clicking the left half goes forward.
    #[serde(rename = "L2R")]
    ForwardOnLeft,
    /// Clicking the right half goes forward.
    #[serde(rename = "R2L")]
    ForwardOnRight,
}

impl TurnDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnDirection::ForwardOnLeft => "L2R",
            TurnDirection::ForwardOnRight => "R2L",
        }
    }
}

impl std::fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TurnDirection {
    type Err = &'static str;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L2R" => Ok(TurnDirection::ForwardOnLeft),
            "R2L" => Ok(TurnDirection::ForwardOnRight),
            _ => Err("unknown page turn direction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Date,
    Size,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Date => "date",
            SortKey::Size => "size",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = &'static str;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "date" => Ok(SortKey::Date),
            "size" => Ok(SortKey::Size),
            _ => Err("unknown sort key"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Forward,
    Backward,
}

/// Snapshot of one archive file produced by a directory scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub display_name: String,
    pub size_bytes: u64,
    pub modified: SystemTime,
}

impl ArchiveEntry {
    pub fn title(&self) -> String {
        book_title(&self.path)
    }

    pub fn size_label(&self) -> String {
        format_size(self.size_bytes)
    }

    pub fn modified_label(&self) -> String {
        format_modified(self.modified)
    }
}

/// 1-based page position for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePosition {
    pub current: usize,
    pub total: usize,
}

impl std::fmt::Display for PagePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.current, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingStatus {
    Unread,
    Reading,
    Finished,
}

pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes > MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes > KIB {
        format!("{:.0} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

pub fn format_modified(time: SystemTime) -> String {
    let local: chrono::DateTime<chrono::Local> = time.into();
    local.format("%Y/%m/%d %H:%M").to_string()
}
