use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::error::{PagesError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub files_written: usize,
}

/// Replace `dest_root` with every entry under `<archive_root>/<language_root>/`,
/// keeping the `<platform>/<page>` remainder of each path.
///
/// Entries are written to a `<dest_root>.partial` sibling which replaces
/// `dest_root` only once the whole archive was extracted, so pages dropped
/// from the archive disappear locally. The whole archive is scanned, so entries
/// of the language root need not be contiguous. An archive without any entry
/// under that prefix fails with [`PagesError::LanguageNotFound`] and leaves
/// `dest_root` untouched.
pub fn extract_pages(
    archive_path: &Path,
    archive_root: &str,
    language_root: &str,
    dest_root: &Path,
) -> Result<ExtractReport> {
    let prefix = format!("{archive_root}/{language_root}/");
    let file = File::open(archive_path).map_err(|error| {
        PagesError::extract(format!(
            "failed to open the archive {}: {error}",
            archive_path.display()
        ))
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(PagesError::extract)?;

    let partial_root = partial_sibling(dest_root)?;
    remove_dir(&partial_root)?;
    create_dir(&partial_root)?;

    let mut language_found = false;
    let mut report = ExtractReport::default();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(PagesError::extract)?;
        let name = entry.name().to_string();
        let Some(remainder) = name.strip_prefix(&prefix) else {
            continue;
        };
        language_found = true;
        if remainder.is_empty() {
            continue;
        }

        let destination = partial_root.join(page_relative_path(remainder)?);
        if entry.is_dir() {
            create_dir(&destination)?;
            continue;
        }
        if let Some(parent) = destination.parent() {
            create_dir(parent)?;
        }
        let output = File::create(&destination).map_err(|error| {
            PagesError::extract(format!(
                "failed to create {}: {error}",
                destination.display()
            ))
        })?;
        let mut writer = BufWriter::new(output);
        io::copy(&mut entry, &mut writer)
            .and_then(|_| writer.flush())
            .map_err(|error| {
                PagesError::extract(format!("failed to extract {name}: {error}"))
            })?;
        report.files_written += 1;
    }

    if !language_found {
        remove_dir(&partial_root)?;
        return Err(PagesError::LanguageNotFound {
            archive_root: archive_root.to_string(),
            language_root: language_root.to_string(),
        });
    }

    remove_dir(dest_root)?;
    fs::rename(&partial_root, dest_root).map_err(|error| {
        PagesError::extract(format!(
            "failed to move {} into place: {error}",
            partial_root.display()
        ))
    })?;
    Ok(report)
}

fn partial_sibling(dest_root: &Path) -> Result<PathBuf> {
    let name = dest_root.file_name().ok_or_else(|| {
        PagesError::extract(format!(
            "destination {} has no directory name",
            dest_root.display()
        ))
    })?;
    let mut partial = name.to_os_string();
    partial.push(".partial");
    Ok(dest_root.with_file_name(partial))
}

fn remove_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(PagesError::extract(format!(
            "failed to remove {}: {error}",
            path.display()
        ))),
    }
}

/// Turn an archive remainder such as `linux/df.md` into a relative path,
/// refusing anything that could escape the destination.
fn page_relative_path(remainder: &str) -> Result<PathBuf> {
    let mut out = PathBuf::new();
    for segment in remainder.split('/').filter(|segment| !segment.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if !segment.contains('\\') => out.push(part),
            _ => {
                return Err(PagesError::extract(format!(
                    "refusing unsafe archive entry path `{remainder}`"
                )));
            }
        }
    }
    if out.as_os_str().is_empty() {
        return Err(PagesError::extract(format!(
            "archive entry `{remainder}` has no file name"
        )));
    }
    Ok(out)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|error| PagesError::extract(format!("failed to create {}: {error}", path.display())))
}
