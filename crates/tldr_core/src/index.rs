use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PagesError, Result};

pub const PAGE_EXTENSION: &str = ".md";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Read,
    Write,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub pages: usize,
    pub by_platform: BTreeMap<String, usize>,
}

/// Open the index for one operation. The handle is closed when dropped.
///
/// Reading a missing index fails with [`PagesError::IndexMissing`]; any
/// failure to create it for writing is a [`PagesError::IndexWrite`].
pub fn open_index(index_path: &Path, mode: IndexMode) -> Result<File> {
    match mode {
        IndexMode::Read => File::open(index_path).map_err(|error| {
            if error.kind() == io::ErrorKind::NotFound {
                PagesError::IndexMissing {
                    path: index_path.to_path_buf(),
                }
            } else {
                PagesError::io(
                    format!("Failed to open index {}", index_path.display()),
                    error,
                )
            }
        }),
        IndexMode::Write => {
            let write_error = |source| PagesError::IndexWrite {
                path: index_path.to_path_buf(),
                source,
            };
            if let Some(parent) = index_path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
            File::create(index_path).map_err(write_error)
        }
    }
}

/// Rewrite the index from the pages under `language_dir`.
///
/// Each page becomes one `<platform>/<file>` line. Platforms named in
/// `platform_priority` are written first, in that order, then the remaining
/// platforms alphabetically; bare-name lookups take the first match, so this
/// order is the platform precedence.
pub fn build_index(
    language_dir: &Path,
    index_path: &Path,
    platform_priority: &[String],
) -> Result<IndexReport> {
    let file = open_index(index_path, IndexMode::Write)?;
    let write_error = |source: io::Error| PagesError::IndexWrite {
        path: index_path.to_path_buf(),
        source,
    };

    let mut pages = Vec::new();
    for entry in WalkDir::new(language_dir)
        .min_depth(2)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|error| write_error(io::Error::from(error)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(platform) = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
        else {
            continue;
        };
        let page = entry.file_name().to_string_lossy().into_owned();
        pages.push((platform, page));
    }

    pages.sort_by(|(left_platform, left_page), (right_platform, right_page)| {
        let left_rank = platform_rank(platform_priority, left_platform);
        let right_rank = platform_rank(platform_priority, right_platform);
        left_rank
            .cmp(&right_rank)
            .then_with(|| left_platform.cmp(right_platform))
            .then_with(|| left_page.cmp(right_page))
    });

    let mut report = IndexReport::default();
    let mut writer = BufWriter::new(file);
    for (platform, page) in &pages {
        writeln!(writer, "{platform}/{page}").map_err(write_error)?;
        *report.by_platform.entry(platform.clone()).or_default() += 1;
    }
    writer.flush().map_err(write_error)?;
    report.pages = pages.len();
    Ok(report)
}

fn platform_rank(priority: &[String], platform: &str) -> usize {
    priority
        .iter()
        .position(|candidate| candidate == platform)
        .unwrap_or(priority.len())
}

/// Lines of the index, read lazily, without terminators.
pub struct IndexEntries {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
}

impl Iterator for IndexEntries {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|line| {
            line.map_err(|error| {
                PagesError::io(format!("Failed to read index {}", self.path.display()), error)
            })
        })
    }
}

pub fn index_entries(index_path: &Path) -> Result<IndexEntries> {
    let file = open_index(index_path, IndexMode::Read)?;
    Ok(IndexEntries {
        lines: BufReader::new(file).lines(),
        path: index_path.to_path_buf(),
    })
}

/// Split `platform/page.md` at the first `/`.
pub fn split_entry(entry: &str) -> (Option<&str>, &str) {
    match entry.split_once('/') {
        Some((platform, page)) => (Some(platform), page),
        None => (None, entry),
    }
}

/// Command name of an index line: platform prefix and extension removed.
pub fn command_name(entry: &str) -> &str {
    let (_, page) = split_entry(entry);
    page.strip_suffix(PAGE_EXTENSION).unwrap_or(page)
}

/// Print every indexed command name, one per line, in index order.
pub fn list_pages(index_path: &Path, sink: &mut dyn Write) -> Result<usize> {
    let mut count = 0;
    for entry in index_entries(index_path)? {
        let entry = entry?;
        if entry.is_empty() {
            continue;
        }
        writeln!(sink, "{}", command_name(&entry))
            .map_err(|error| PagesError::io("Failed to print page list", error))?;
        count += 1;
    }
    Ok(count)
}
