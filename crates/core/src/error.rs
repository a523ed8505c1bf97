use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("folder does not exist: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("not a valid zip/cbz archive: {} ({reason})", path.display())]
    InvalidArchive { path: PathBuf, reason: String },

    #[error("archive contains no images: {}", path.display())]
    EmptyArchive { path: PathBuf },

    #[error("failed to load page {} ({name}): {reason}", index + 1)]
    PageLoad {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
