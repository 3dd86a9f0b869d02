use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::config::{Settings, StyleSection};
use crate::error::{PagesError, Result};
use crate::resolve::resolve_page;
use crate::runtime::ResolvedPaths;

pub const RESET_STYLING: &str = "\x1b[0m";
pub const HEADING_STYLE: &str = "\x1b[1m";
pub const DESCRIPTION_STYLE: &str = "\x1b[3m";
pub const EXAMPLE_STYLE: &str = "\x1b[32m";
pub const COMMAND_STYLE: &str = "\x1b[36m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Description,
    Example,
    Command,
    Plain,
}

impl LineKind {
    pub fn classify(line: &[u8]) -> Self {
        match line.first() {
            Some(b'#') => Self::Heading,
            Some(b'>') => Self::Description,
            Some(b'-') => Self::Example,
            Some(b'`') => Self::Command,
            _ => Self::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStyles {
    pub heading: String,
    pub description: String,
    pub example: String,
    pub command: String,
    pub reset: String,
}

impl Default for PageStyles {
    fn default() -> Self {
        Self {
            heading: HEADING_STYLE.to_string(),
            description: DESCRIPTION_STYLE.to_string(),
            example: EXAMPLE_STYLE.to_string(),
            command: COMMAND_STYLE.to_string(),
            reset: RESET_STYLING.to_string(),
        }
    }
}

impl PageStyles {
    pub fn from_section(section: &StyleSection) -> Self {
        let defaults = Self::default();
        Self {
            heading: section.heading.clone().unwrap_or(defaults.heading),
            description: section.description.clone().unwrap_or(defaults.description),
            example: section.example.clone().unwrap_or(defaults.example),
            command: section.command.clone().unwrap_or(defaults.command),
            reset: defaults.reset,
        }
    }

    fn start(&self, kind: LineKind) -> Option<&str> {
        match kind {
            LineKind::Heading => Some(self.heading.as_str()),
            LineKind::Description => Some(self.description.as_str()),
            LineKind::Example => Some(self.example.as_str()),
            LineKind::Command => Some(self.command.as_str()),
            LineKind::Plain => None,
        }
    }
}

/// Stream `page` into `sink`, one styled line at a time.
///
/// Lines made only of a terminator are dropped. Styled lines keep their
/// terminator inside the style/reset pair.
pub fn render<R: BufRead>(mut page: R, styles: &PageStyles, sink: &mut dyn Write) -> Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = page
            .read_until(b'\n', &mut line)
            .map_err(|error| PagesError::io("Failed to read page", error))?;
        if read == 0 {
            return Ok(());
        }
        if line == b"\n" || line == b"\r\n" {
            continue;
        }
        write_line(&line, styles, sink)
            .map_err(|error| PagesError::io("Failed to print page", error))?;
    }
}

fn write_line(line: &[u8], styles: &PageStyles, sink: &mut dyn Write) -> std::io::Result<()> {
    match styles.start(LineKind::classify(line)) {
        Some(style) => {
            sink.write_all(style.as_bytes())?;
            sink.write_all(line)?;
            sink.write_all(styles.reset.as_bytes())
        }
        None => sink.write_all(line),
    }
}

pub fn render_page(page_path: &Path, styles: &PageStyles, sink: &mut dyn Write) -> Result<()> {
    let file = File::open(page_path).map_err(|error| {
        PagesError::io(format!("Failed to open page {}", page_path.display()), error)
    })?;
    render(BufReader::new(file), styles, sink)
}

/// Resolve `name` through the index and render the matching page.
pub fn show_page(
    paths: &ResolvedPaths,
    settings: &Settings,
    name: &str,
    sink: &mut dyn Write,
) -> Result<()> {
    let relative = resolve_page(&paths.index_path, name)?;
    let page_path = settings.language_dir(paths).join(&relative);
    render_page(&page_path, &settings.styles, sink)
}
