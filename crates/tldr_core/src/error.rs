use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every failure is terminal for the current invocation; the binary prints the
/// message on one line and exits with status 1.
#[derive(Error, Debug)]
pub enum PagesError {
    #[error("Failed to fetch pages; details: {details}")]
    Fetch { details: String },

    #[error("Failed to extract pages; details: {details}")]
    Extract { details: String },

    #[error(
        "Failed to extract pages; details: `{language_root}` is not present under `{archive_root}/` in the archive"
    )]
    LanguageNotFound {
        archive_root: String,
        language_root: String,
    },

    #[error("Failed to open index {}, probably you should run `tldr -u`", path.display())]
    IndexMissing { path: PathBuf },

    #[error("Failed to write index {}; details: {source}", path.display())]
    IndexWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("The page `{name}` has not been found")]
    NotFound { name: String },

    #[error("Invalid configuration; details: {0}")]
    Config(String),

    #[error("{context}; details: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl PagesError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn extract(details: impl ToString) -> Self {
        Self::Extract {
            details: details.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PagesError>;
