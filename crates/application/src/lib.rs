//! Navigation controller for Comicshelf.
//!
//! [`Navigator`] owns the catalog of the current folder, the open
//! [`ReadingSession`] and the [`Storage`], and reacts to discrete input events.
//! Everything it shows goes through a [`Renderer`]; user decisions are exposed
//! as a pending [`Prompt`] and fed back with [`Navigator::answer`].

use std::path::{Path, PathBuf};

use comicshelf_core::{
    ArchiveEntry, Error, PagePosition, PageStep, Preferences, ReadingStatus, SortKey, path_key,
};
use comicshelf_engine::{PageImage, ReadingSession};
use comicshelf_storage::Storage;
use log::{debug, info, warn};

mod gesture;
mod transition;

pub use gesture::{DRAG_THRESHOLD_PX, PointerGesture, click_step};
pub use transition::{SLIDE_STEPS, SLIDE_TICK, SlideFrame, Transition};

/// Output side of the controller.
pub trait Renderer {
    fn show_page(&mut self, page: &PageImage);
    fn show_slide(&mut self, frame: SlideFrame<'_>);
    /// Replaces the page with a text message.
    fn show_message(&mut self, message: &str);
    /// `None` clears the indicator.
    fn show_position(&mut self, position: Option<PagePosition>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PageLoaded,
    Animating,
}

#[derive(Debug)]
enum State {
    Idle,
    PageLoaded,
    Animating(Transition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveDirection {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

/// A decision the user has to make before navigation continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Resume at `page` (0-based) or start over.
    Resume {
        path: PathBuf,
        title: String,
        page: usize,
    },
    /// The last page was reached; move on to the next archive?
    NextArchive { path: PathBuf, title: String },
}

impl Prompt {
    pub fn message(&self) -> String {
        match self {
            Prompt::Resume { title, page, .. } => {
                format!("\"{title}\"\nContinue from page {}?", page + 1)
            }
            Prompt::NextArchive { title, .. } => {
                format!("Last page reached. Go on to \"{title}\"?")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Cancel,
}

pub struct Navigator<R> {
    storage: Storage,
    renderer: R,
    folder: Option<PathBuf>,
    catalog: Vec<ArchiveEntry>,
    session: Option<ReadingSession>,
    state: State,
    prompt: Option<Prompt>,
    gesture: PointerGesture,
}

impl<R: Renderer> Navigator<R> {
    pub fn new(storage: Storage, renderer: R) -> Self {
        Self {
            storage,
            renderer,
            folder: None,
            catalog: Vec::new(),
            session: None,
            state: State::Idle,
            prompt: None,
            gesture: PointerGesture::default(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn preferences(&self) -> &Preferences {
        self.storage.settings()
    }

    pub fn history(&self) -> &[String] {
        self.storage.history()
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn catalog(&self) -> &[ArchiveEntry] {
        &self.catalog
    }

    pub fn session(&self) -> Option<&ReadingSession> {
        self.session.as_ref()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::PageLoaded => Phase::PageLoaded,
            State::Animating(_) => Phase::Animating,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, State::Animating(_))
    }

    pub fn status_of(&self, entry: &ArchiveEntry) -> ReadingStatus {
        if let Some(session) = &self.session
            && session.archive_path() == entry.path
            && session.is_on_last_page()
        {
            return ReadingStatus::Finished;
        }
        match self.storage.progress(&path_key(&entry.path)) {
            Some(index) if index > 0 => ReadingStatus::Reading,
            _ => ReadingStatus::Unread,
        }
    }

    /// Makes `path` the current folder and scans it.
    pub fn open_folder(&mut self, path: &Path) {
        if !path.is_dir() {
            self.report(&Error::DirectoryNotFound {
                path: path.to_path_buf(),
            });
            return;
        }
        info!("open folder {}", path.display());
        self.folder = Some(path.to_path_buf());
        let key = path_key(path);
        let result = self.storage.touch_folder(&key);
        self.persisted(result);
        self.rescan();
    }

    /// Rebuilds the catalog of the current folder with the current sort settings.
    pub fn rescan(&mut self) {
        let Some(folder) = self.folder.clone() else {
            return;
        };
        let prefs = self.storage.settings().clone();
        match comicshelf_engine::scan(&folder, prefs.sort_key, prefs.sort_descending) {
            Ok(entries) => {
                self.catalog = entries;
                if self.catalog.is_empty() && self.session.is_none() {
                    self.renderer
                        .show_message("No zip/cbz files found in this folder.");
                    self.renderer.show_position(None);
                }
            }
            Err(err) => {
                self.catalog.clear();
                self.report(&err);
            }
        }
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        let result = self.storage.update_settings(|prefs| prefs.set_sort_key(key));
        self.persisted(result);
        self.rescan();
    }

    pub fn cycle_sort_key(&mut self) {
        let result = self.storage.update_settings(Preferences::cycle_sort_key);
        self.persisted(result);
        self.rescan();
    }

    pub fn toggle_sort_order(&mut self) {
        let result = self.storage.update_settings(Preferences::toggle_sort_order);
        self.persisted(result);
        self.rescan();
    }

    pub fn toggle_animation(&mut self) {
        let result = self.storage.update_settings(Preferences::toggle_animation);
        self.persisted(result);
    }

    pub fn toggle_turn_direction(&mut self) {
        let result = self
            .storage
            .update_settings(Preferences::toggle_turn_direction);
        self.persisted(result);
    }

    /// Opens an archive, asking first when there is progress to resume.
    pub fn select_archive(&mut self, path: &Path) {
        if self.is_busy() {
            debug!("ignore selection of {} while busy", path.display());
            return;
        }
        match self.storage.progress(&path_key(path)) {
            Some(page) if page > 0 => {
                self.prompt = Some(Prompt::Resume {
                    path: path.to_path_buf(),
                    title: comicshelf_core::book_title(path),
                    page,
                });
            }
            _ => self.open_at(path, 0),
        }
    }

    pub fn answer(&mut self, answer: Answer) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        debug!("answer {answer:?} to {prompt:?}");
        match (prompt, answer) {
            (Prompt::Resume { path, page, .. }, Answer::Yes) => self.open_at(&path, page),
            (Prompt::Resume { path, .. }, Answer::No) => self.open_at(&path, 0),
            (Prompt::NextArchive { path, .. }, Answer::Yes) => self.open_recorded(&path),
            (_, _) => {}
        }
    }

    pub fn request_next_page(&mut self) {
        self.request_page(PageStep::Forward);
    }

    pub fn request_previous_page(&mut self) {
        self.request_page(PageStep::Backward);
    }

    /// Opens the neighbor of the current archive in the catalog ordering.
    ///
    /// No-op when there is no neighbor or the current archive is no longer listed.
    pub fn request_adjacent_archive(&mut self, direction: ArchiveDirection) {
        if self.is_busy() {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        let Some(position) = self
            .catalog
            .iter()
            .position(|entry| entry.path == session.archive_path())
        else {
            debug!("{} not in catalog", session.archive_path().display());
            return;
        };
        let neighbor = match direction {
            ArchiveDirection::Next => position.checked_add(1),
            ArchiveDirection::Previous => position.checked_sub(1),
        };
        let Some(entry) = neighbor.and_then(|i| self.catalog.get(i)) else {
            return;
        };
        let path = entry.path.clone();
        self.open_recorded(&path);
    }

    /// Advances or retreats one animation step. Call on every timer tick.
    pub fn tick(&mut self) {
        let State::Animating(transition) = &mut self.state else {
            return;
        };
        if !transition.advance() {
            self.renderer.show_slide(transition.frame());
            return;
        }
        let State::Animating(transition) = std::mem::replace(&mut self.state, State::PageLoaded)
        else {
            return;
        };
        let step = transition.step();
        self.commit(transition.into_page(), step);
    }

    pub fn wheel(&mut self, direction: WheelDirection) {
        if self.session.is_none() {
            return;
        }
        match direction {
            WheelDirection::Up => self.request_previous_page(),
            WheelDirection::Down => self.request_next_page(),
        }
    }

    pub fn pointer_pressed(&mut self, x: i32, y: i32) {
        if self.session.is_none() || self.is_animating() {
            return;
        }
        self.gesture.press(x, y);
    }

    pub fn pointer_moved(&mut self, x: i32, y: i32) {
        if self.is_animating() {
            return;
        }
        self.gesture.moved(x, y);
    }

    /// Ends a press; a click turns the page by the half of `width` it landed in.
    pub fn pointer_released(&mut self, x: i32, width: i32) {
        if self.is_animating() {
            self.gesture.cancel();
            return;
        }
        let direction = self.storage.settings().page_turn_direction;
        if let Some(step) = self.gesture.release(x, width, direction) {
            self.request_page(step);
        }
    }

    /// Drops a press without turning the page, e.g. a release off the page.
    pub fn pointer_cancelled(&mut self) {
        self.gesture.cancel();
    }

    fn is_busy(&self) -> bool {
        self.prompt.is_some() || self.is_animating()
    }

    fn request_page(&mut self, step: PageStep) {
        if self.is_busy() {
            debug!("ignore {step:?} while busy");
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        let Some(target) = session.neighbor(step) else {
            return;
        };
        let page = match session.read_page(target) {
            Ok(page) => page,
            Err(err) => {
                self.report(&err);
                return;
            }
        };

        if self.storage.settings().animation_enabled {
            let transition = Transition::new(page, step);
            self.renderer.show_slide(transition.frame());
            self.state = State::Animating(transition);
        } else {
            self.commit(page, step);
        }
    }

    fn commit(&mut self, page: PageImage, step: PageStep) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.commit(&page);
        self.state = State::PageLoaded;
        let key = path_key(session.archive_path());
        let position = session.position();
        let at_end = session.is_on_last_page();

        self.renderer.show_page(&page);
        self.renderer.show_position(position);
        let result = self.storage.record_progress(&key, page.index);
        self.persisted(result);

        if step == PageStep::Forward && at_end {
            self.offer_next_archive();
        }
    }

    /// Opens `path` at its recorded page, without asking.
    fn open_recorded(&mut self, path: &Path) {
        let start = self.storage.progress(&path_key(path)).unwrap_or(0);
        self.open_at(path, start);
    }

    /// Opens `path` on page `start` (clamped). The previous session survives a failure.
    fn open_at(&mut self, path: &Path, start: usize) {
        let mut session = match ReadingSession::open(path) {
            Ok(session) => session,
            Err(err) => {
                self.report(&err);
                return;
            }
        };
        let start = session.clamp_index(start);
        let page = match session.load_page(start) {
            Ok(page) => page,
            Err(err) => {
                self.report(&err);
                return;
            }
        };
        info!("open {} at page {}", path.display(), start + 1);

        let key = path_key(path);
        let position = session.position();
        self.session = Some(session);
        self.state = State::PageLoaded;
        self.renderer.show_page(&page);
        self.renderer.show_position(position);
        let result = self.storage.record_progress(&key, start);
        self.persisted(result);
    }

    fn offer_next_archive(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(position) = self
            .catalog
            .iter()
            .position(|entry| entry.path == session.archive_path())
        else {
            return;
        };
        if let Some(next) = self.catalog.get(position + 1) {
            self.prompt = Some(Prompt::NextArchive {
                path: next.path.clone(),
                title: next.title(),
            });
        }
    }

    fn report(&mut self, err: &Error) {
        warn!("{err}");
        self.renderer.show_message(&err.to_string());
        self.renderer.show_position(None);
    }

    fn persisted(&self, result: comicshelf_core::Result<()>) {
        if let Err(err) = result {
            warn!("state not saved: {err}");
        }
    }
}
