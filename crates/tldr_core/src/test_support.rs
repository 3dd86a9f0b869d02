use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::Path;

use zip::ZipWriter;
use zip::write::FileOptions;

pub(crate) struct ArchiveEntry {
    name: &'static str,
    content: Option<&'static str>,
}

impl ArchiveEntry {
    pub(crate) fn dir(name: &'static str) -> Self {
        Self {
            name,
            content: None,
        }
    }

    pub(crate) fn file(name: &'static str, content: &'static str) -> Self {
        Self {
            name,
            content: Some(content),
        }
    }
}

pub(crate) fn archive_bytes(entries: &[ArchiveEntry]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for entry in entries {
        match entry.content {
            Some(content) => {
                writer.start_file(entry.name, options).expect("start file");
                writer.write_all(content.as_bytes()).expect("write entry");
            }
            None => writer
                .add_directory(entry.name.trim_end_matches('/'), options)
                .expect("add directory"),
        }
    }
    writer.finish().expect("finish archive").into_inner()
}

pub(crate) fn write_archive(path: &Path, entries: &[ArchiveEntry]) {
    let mut file = File::create(path).expect("create archive");
    file.write_all(&archive_bytes(entries)).expect("write archive");
}

/// Lay out `<root>/<platform>/<page>` files directly, bypassing extraction.
pub(crate) fn seed_pages(root: &Path, pages: &[(&str, &str)]) {
    for (relative, content) in pages {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("page parent")).expect("create platform dir");
        fs::write(&path, content).expect("write page");
    }
}
