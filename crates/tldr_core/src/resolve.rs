use std::path::Path;

use crate::error::{PagesError, Result};
use crate::index::{PAGE_EXTENSION, index_entries, split_entry};

/// A page request as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageName<'a> {
    /// `cmd`: any platform, first index match wins.
    Bare(&'a str),
    /// `platform/cmd`: exact index line.
    Qualified(&'a str),
}

impl<'a> PageName<'a> {
    pub fn parse(name: &'a str) -> Self {
        if name.contains('/') {
            Self::Qualified(name)
        } else {
            Self::Bare(name)
        }
    }

    fn matches(&self, entry: &str) -> bool {
        let (wanted, candidate) = match self {
            Self::Qualified(name) => (*name, entry),
            Self::Bare(name) => match split_entry(entry) {
                (Some(_), page) => (*name, page),
                (None, _) => return false,
            },
        };
        candidate
            .strip_suffix(PAGE_EXTENSION)
            .is_some_and(|stem| stem == wanted)
    }
}

/// Find the index entry for `name`, returning the `platform/page.md` path
/// relative to the language root.
pub fn resolve_page(index_path: &Path, name: &str) -> Result<String> {
    let wanted = PageName::parse(name);
    for entry in index_entries(index_path)? {
        let entry = entry?;
        if wanted.matches(&entry) {
            return Ok(entry);
        }
    }
    Err(PagesError::NotFound {
        name: name.to_string(),
    })
}
