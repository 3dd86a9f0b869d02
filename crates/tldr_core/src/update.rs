use std::io::Write;

use crate::archive::{ArchiveSource, HttpArchiveSource, fetch_archive};
use crate::config::Settings;
use crate::error::{PagesError, Result};
use crate::extract::{ExtractReport, extract_pages};
use crate::index::{IndexReport, build_index};
use crate::runtime::ResolvedPaths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub extract: ExtractReport,
    pub index: IndexReport,
}

pub fn update_pages(
    paths: &ResolvedPaths,
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<UpdateReport> {
    let mut source = HttpArchiveSource::from_settings(settings)?;
    update_pages_with_source(paths, settings, &mut source, out)
}

/// Fetch, extract and index in order; the first failing stage aborts the rest.
pub fn update_pages_with_source(
    paths: &ResolvedPaths,
    settings: &Settings,
    source: &mut dyn ArchiveSource,
    out: &mut dyn Write,
) -> Result<UpdateReport> {
    stage(out, "Fetching pages...")?;
    let staged = fetch_archive(source, &settings.staging_path)?;

    stage(out, "Extracting pages...")?;
    let language_dir = settings.language_dir(paths);
    let extract = extract_pages(
        &staged,
        &settings.archive_root,
        &settings.language_root,
        &language_dir,
    )?;

    stage(out, "Indexing pages...")?;
    let index = build_index(
        &language_dir,
        &paths.index_path,
        &settings.platform_priority(),
    )?;

    Ok(UpdateReport { extract, index })
}

fn stage(out: &mut dyn Write, label: &str) -> Result<()> {
    writeln!(out, "{label}")
        .and_then(|()| out.flush())
        .map_err(|error| PagesError::io("Failed to print progress", error))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::update_pages_with_source;
    use crate::archive::tests::MockArchiveSource;
    use crate::config::{PagesConfig, Settings};
    use crate::error::PagesError;
    use crate::index::list_pages;
    use crate::resolve::resolve_page;
    use crate::runtime::ResolvedPaths;
    use crate::test_support::{ArchiveEntry, archive_bytes};

    fn test_settings(temp: &std::path::Path) -> Settings {
        let mut settings =
            Settings::resolve_with_lookup(&PagesConfig::default(), |_| None).expect("settings");
        settings.staging_path = temp.join("staging").join("pages.zip");
        settings.platform = "linux".to_string();
        settings
    }

    #[test]
    fn update_extracts_and_indexes_archive() {
        let temp = tempdir().expect("tempdir");
        let paths = ResolvedPaths::under(temp.path().join("cache"));
        let settings = test_settings(temp.path());
        let mut source = MockArchiveSource::serving(archive_bytes(&[
            ArchiveEntry::dir("tldr-main/"),
            ArchiveEntry::dir("tldr-main/pages/"),
            ArchiveEntry::file("tldr-main/pages/platformA/cmd1.md", "# cmd1\n> one\n"),
            ArchiveEntry::file("tldr-main/pages/platformB/cmd2.md", "# cmd2\n- two\n"),
        ]));

        let mut out = Vec::<u8>::new();
        let report =
            update_pages_with_source(&paths, &settings, &mut source, &mut out).expect("update");

        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "Fetching pages...\nExtracting pages...\nIndexing pages...\n"
        );
        assert_eq!(report.extract.files_written, 2);
        assert_eq!(report.index.pages, 2);

        let mut lines = fs::read_to_string(&paths.index_path)
            .expect("read index")
            .lines()
            .map(str::to_string)
            .collect::<Vec<_>>();
        lines.sort();
        assert_eq!(lines, vec!["platformA/cmd1.md", "platformB/cmd2.md"]);

        let language_dir = settings.language_dir(&paths);
        assert_eq!(
            fs::read_to_string(language_dir.join("platformA").join("cmd1.md")).expect("read"),
            "# cmd1\n> one\n"
        );
        assert_eq!(
            fs::read_to_string(language_dir.join("platformB").join("cmd2.md")).expect("read"),
            "# cmd2\n- two\n"
        );
    }

    #[test]
    fn updated_index_prefers_host_platform_for_bare_names() {
        let temp = tempdir().expect("tempdir");
        let paths = ResolvedPaths::under(temp.path().join("cache"));
        let settings = test_settings(temp.path());
        let mut source = MockArchiveSource::serving(archive_bytes(&[
            ArchiveEntry::file("tldr-main/pages/common/df.md", "# df\n"),
            ArchiveEntry::file("tldr-main/pages/android/df.md", "# df\n"),
            ArchiveEntry::file("tldr-main/pages/linux/df.md", "# df\n"),
            ArchiveEntry::file("tldr-main/pages/osx/open.md", "# open\n"),
        ]));

        update_pages_with_source(&paths, &settings, &mut source, &mut Vec::<u8>::new())
            .expect("update");

        assert_eq!(resolve_page(&paths.index_path, "df").expect("df"), "linux/df.md");
        assert_eq!(
            resolve_page(&paths.index_path, "open").expect("open"),
            "osx/open.md"
        );

        let mut listed = Vec::<u8>::new();
        list_pages(&paths.index_path, &mut listed).expect("list");
        assert_eq!(
            String::from_utf8(listed).expect("utf8"),
            "df\ndf\ndf\nopen\n"
        );
    }

    #[test]
    fn pages_dropped_upstream_are_gone_after_update() {
        let temp = tempdir().expect("tempdir");
        let paths = ResolvedPaths::under(temp.path().join("cache"));
        let settings = test_settings(temp.path());

        let mut first = MockArchiveSource::serving(archive_bytes(&[
            ArchiveEntry::file("tldr-main/pages/linux/a.md", "# a\n"),
            ArchiveEntry::file("tldr-main/pages/linux/removed.md", "# removed\n"),
        ]));
        update_pages_with_source(&paths, &settings, &mut first, &mut Vec::<u8>::new())
            .expect("first update");
        assert_eq!(
            resolve_page(&paths.index_path, "removed").expect("removed"),
            "linux/removed.md"
        );

        let mut second = MockArchiveSource::serving(archive_bytes(&[ArchiveEntry::file(
            "tldr-main/pages/linux/a.md",
            "# a\n",
        )]));
        let report =
            update_pages_with_source(&paths, &settings, &mut second, &mut Vec::<u8>::new())
                .expect("second update");

        assert_eq!(report.index.pages, 1);
        assert_eq!(
            fs::read_to_string(&paths.index_path).expect("read index"),
            "linux/a.md\n"
        );
        assert!(matches!(
            resolve_page(&paths.index_path, "removed").expect_err("must fail"),
            PagesError::NotFound { .. }
        ));
        assert!(
            !settings
                .language_dir(&paths)
                .join("linux")
                .join("removed.md")
                .exists()
        );
    }

    #[test]
    fn fetch_failure_aborts_before_extraction() {
        let temp = tempdir().expect("tempdir");
        let paths = ResolvedPaths::under(temp.path().join("cache"));
        let settings = test_settings(temp.path());
        let mut source = MockArchiveSource::failing("HTTP status server error (503)");

        let mut out = Vec::<u8>::new();
        let error = update_pages_with_source(&paths, &settings, &mut source, &mut out)
            .expect_err("must fail");

        assert!(matches!(error, PagesError::Fetch { .. }));
        assert_eq!(String::from_utf8(out).expect("utf8"), "Fetching pages...\n");
        assert!(!paths.index_path.exists());
    }

    #[test]
    fn missing_language_aborts_before_indexing() {
        let temp = tempdir().expect("tempdir");
        let paths = ResolvedPaths::under(temp.path().join("cache"));
        let mut settings = test_settings(temp.path());
        settings.language_root = "pages.xx".to_string();
        let mut source = MockArchiveSource::serving(archive_bytes(&[ArchiveEntry::file(
            "tldr-main/pages/linux/df.md",
            "# df\n",
        )]));

        let error = update_pages_with_source(&paths, &settings, &mut source, &mut Vec::<u8>::new())
            .expect_err("must fail");
        assert!(matches!(error, PagesError::LanguageNotFound { .. }));
        assert!(!paths.index_path.exists());
    }
}
