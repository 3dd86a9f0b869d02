use std::env;
use std::path::{Path, PathBuf};

use crate::error::{PagesError, Result};

pub const PAGES_DIR_NAME: &str = ".tldr";
pub const INDEX_FILENAME: &str = "index";
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Env,
    Home,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Home => "home",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub pages_root: PathBuf,
    pub index_path: PathBuf,
    pub config_path: PathBuf,
    pub root_source: ValueSource,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    /// Layout rooted at an explicit directory, used by tests and embedders.
    pub fn under(pages_root: impl Into<PathBuf>) -> Self {
        let pages_root = pages_root.into();
        Self {
            index_path: pages_root.join(INDEX_FILENAME),
            config_path: pages_root.join(CONFIG_FILENAME),
            pages_root,
            root_source: ValueSource::Default,
            config_source: ValueSource::Default,
        }
    }

    pub fn diagnostics(&self) -> String {
        format!(
            "pages_root={} ({})\nindex_path={}\nconfig_path={} ({})",
            normalize_for_display(&self.pages_root),
            self.root_source.as_str(),
            normalize_for_display(&self.index_path),
            normalize_for_display(&self.config_path),
            self.config_source.as_str(),
        )
    }
}

pub fn resolve_paths() -> Result<ResolvedPaths> {
    resolve_paths_with_lookup(|key| env::var(key).ok())
}

pub fn resolve_paths_with_lookup<F>(lookup_env: F) -> Result<ResolvedPaths>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| {
        lookup_env(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let (pages_root, root_source) = if let Some(value) = lookup("TLDR_PAGES_ROOT") {
        (PathBuf::from(value), ValueSource::Env)
    } else if let Some(home) = lookup("HOME") {
        (Path::new(&home).join(PAGES_DIR_NAME), ValueSource::Home)
    } else {
        return Err(PagesError::Config(
            "HOME is not set; set HOME or TLDR_PAGES_ROOT to locate the page cache".to_string(),
        ));
    };
    if !pages_root.is_absolute() {
        return Err(PagesError::Config(format!(
            "page cache root must be an absolute path, got {}",
            pages_root.display()
        )));
    }

    let (config_path, config_source) = if let Some(value) = lookup("TLDR_CONFIG") {
        (absolutize(Path::new(&value), &pages_root), ValueSource::Env)
    } else {
        (pages_root.join(CONFIG_FILENAME), ValueSource::Default)
    };

    Ok(ResolvedPaths {
        index_path: pages_root.join(INDEX_FILENAME),
        pages_root,
        config_path,
        root_source,
        config_source,
    })
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
