use std::fs::File;
use std::io::{BufReader, Read as _};
use std::path::{Path, PathBuf};

use comicshelf_core::{Error, PagePosition, PageStep, Result, book_title, is_image_name};
use log::debug;
use zip::ZipArchive;

/// A decoded page ready for the renderer.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub index: usize,
    pub name: String,
    pub image: image::DynamicImage,
}

/// One opened archive: its ordered page list and the page cursor.
///
/// The page list is read once at open time. Pages are read by re-opening the
/// container on each load.
#[derive(Debug, Clone)]
pub struct ReadingSession {
    archive_path: PathBuf,
    pages: Vec<String>,
    current: Option<usize>,
}

impl ReadingSession {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let archive_path = path.as_ref().to_path_buf();
        let archive = open_archive(&archive_path)?;

        // Plain case-insensitive order: "10.jpg" sorts before "2.jpg".
        let mut pages = archive
            .file_names()
            .filter(|name| is_image_name(name))
            .map(str::to_string)
            .collect::<Vec<_>>();
        pages.sort_by_cached_key(|name| name.to_lowercase());

        if pages.is_empty() {
            return Err(Error::EmptyArchive { path: archive_path });
        }
        debug!("opened {} with {} pages", archive_path.display(), pages.len());

        Ok(Self {
            archive_path,
            pages,
            current: None,
        })
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn title(&self) -> String {
        book_title(&self.archive_path)
    }

    pub fn page_names(&self) -> &[String] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// `None` until the first page has been loaded.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn position(&self) -> Option<PagePosition> {
        self.current.map(|index| PagePosition {
            current: index + 1,
            total: self.pages.len(),
        })
    }

    pub fn last_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn is_on_last_page(&self) -> bool {
        self.current == Some(self.last_index())
    }

    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// The index one step away from the cursor, or `None` at a boundary.
    pub fn neighbor(&self, step: PageStep) -> Option<usize> {
        match (self.current, step) {
            (None, PageStep::Forward) => Some(0),
            (None, PageStep::Backward) => None,
            (Some(index), PageStep::Forward) => (index < self.last_index()).then_some(index + 1),
            (Some(index), PageStep::Backward) => index.checked_sub(1),
        }
    }

    /// Moves the cursor one step without reading the page. Clamps at both ends.
    pub fn advance(&mut self, step: PageStep) -> Option<usize> {
        let next = self.neighbor(step)?;
        self.current = Some(next);
        Some(next)
    }

    /// Reads and decodes a page without touching the cursor.
    pub fn read_page(&self, index: usize) -> Result<PageImage> {
        let Some(name) = self.pages.get(index) else {
            return Err(Error::PageLoad {
                index,
                name: String::new(),
                reason: format!("page index out of range (0..{})", self.pages.len()),
            });
        };
        let page_error = |reason: String| Error::PageLoad {
            index,
            name: name.clone(),
            reason,
        };

        let file = File::open(&self.archive_path).map_err(|err| page_error(err.to_string()))?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|err| page_error(err.to_string()))?;
        let mut entry = archive
            .by_name(name)
            .map_err(|err| page_error(err.to_string()))?;
        // The declared size comes from the archive header and may be forged.
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|err| page_error(err.to_string()))?;
        let image = image::load_from_memory(&bytes).map_err(|err| page_error(err.to_string()))?;

        Ok(PageImage {
            index,
            name: name.clone(),
            image,
        })
    }

    /// Reads a page and moves the cursor to it. On failure the cursor stays put.
    pub fn load_page(&mut self, index: usize) -> Result<PageImage> {
        let page = self.read_page(index)?;
        self.current = Some(index);
        Ok(page)
    }

    /// Moves the cursor to a page that was already read with [`Self::read_page`].
    pub fn commit(&mut self, page: &PageImage) {
        if page.index < self.pages.len() {
            self.current = Some(page.index);
        }
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let invalid = |reason: String| Error::InvalidArchive {
        path: path.to_path_buf(),
        reason,
    };
    let file = File::open(path).map_err(|err| invalid(err.to_string()))?;
    ZipArchive::new(BufReader::new(file)).map_err(|err| invalid(err.to_string()))
}
