use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PagesError, Result};
use crate::render::PageStyles;
use crate::runtime::ResolvedPaths;

pub const DEFAULT_ARCHIVE_URL: &str = "https://github.com/tldr-pages/tldr/archive/refs/heads/main.zip";
pub const DEFAULT_ARCHIVE_ROOT: &str = "tldr-main";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_STAGING_FILENAME: &str = "tldr-pages.zip";
pub const DEFAULT_LANGUAGE_ROOT: &str = "pages";

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct PagesConfig {
    #[serde(default)]
    pub pages: PagesSection,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub style: StyleSection,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct PagesSection {
    pub archive_url: Option<String>,
    pub archive_root: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub staging_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct HttpSection {
    pub timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct StyleSection {
    pub heading: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
    pub command: Option<String>,
}

/// Effective settings after applying env > config file > default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub archive_url: String,
    pub archive_root: String,
    pub language_root: String,
    pub platform: String,
    pub staging_path: PathBuf,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub styles: PageStyles,
}

impl Settings {
    pub fn resolve(config: &PagesConfig) -> Result<Self> {
        Self::resolve_with_lookup(config, |key| env::var(key).ok())
    }

    pub fn resolve_with_lookup<F>(config: &PagesConfig, lookup_env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            lookup_env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let archive_url = lookup("TLDR_ARCHIVE_URL")
            .or_else(|| config.pages.archive_url.clone())
            .unwrap_or_else(|| DEFAULT_ARCHIVE_URL.to_string());
        let archive_root = lookup("TLDR_ARCHIVE_ROOT")
            .or_else(|| config.pages.archive_root.clone())
            .unwrap_or_else(|| DEFAULT_ARCHIVE_ROOT.to_string());
        if archive_root.trim_matches('/').is_empty() || archive_root.contains('/') {
            return Err(PagesError::Config(format!(
                "archive root must be a single directory name, got `{archive_root}`"
            )));
        }

        let language = lookup("TLDR_LANGUAGE").or_else(|| config.pages.language.clone());
        let language_root = language_root_for(language.as_deref())?;

        let platform = lookup("TLDR_PLATFORM")
            .or_else(|| config.pages.platform.clone())
            .unwrap_or_else(|| host_platform().to_string());

        let staging_path = lookup("TLDR_STAGING_PATH")
            .map(PathBuf::from)
            .or_else(|| config.pages.staging_path.clone())
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_STAGING_FILENAME));

        let timeout_ms = match lookup("TLDR_HTTP_TIMEOUT_MS") {
            Some(value) => value.parse::<u64>().map_err(|_| {
                PagesError::Config(format!("TLDR_HTTP_TIMEOUT_MS is not a number: `{value}`"))
            })?,
            None => config.http.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        };
        let user_agent = lookup("TLDR_USER_AGENT")
            .or_else(|| config.http.user_agent.clone())
            .unwrap_or_else(default_user_agent);

        Ok(Self {
            archive_url,
            archive_root,
            language_root,
            platform,
            staging_path,
            timeout_ms,
            user_agent,
            styles: PageStyles::from_section(&config.style),
        })
    }

    /// Local directory mirroring the archive's language root.
    pub fn language_dir(&self, paths: &ResolvedPaths) -> PathBuf {
        paths.pages_root.join(&self.language_root)
    }

    /// Platforms whose pages win bare-name lookups, highest first.
    pub fn platform_priority(&self) -> Vec<String> {
        let mut out = vec![self.platform.clone()];
        if self.platform != "common" {
            out.push("common".to_string());
        }
        out
    }

    pub fn diagnostics(&self) -> String {
        format!(
            "archive_url={}\narchive_root={}\nlanguage_root={}\nplatform={}\nstaging_path={}\ntimeout_ms={}\nuser_agent={}",
            self.archive_url,
            self.archive_root,
            self.language_root,
            self.platform,
            self.staging_path.display(),
            self.timeout_ms,
            self.user_agent
        )
    }
}

/// Load and parse a PagesConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<PagesConfig> {
    if !config_path.exists() {
        return Ok(PagesConfig::default());
    }
    let content = fs::read_to_string(config_path).map_err(|error| {
        PagesError::Config(format!("failed to read {}: {error}", config_path.display()))
    })?;
    toml::from_str(&content).map_err(|error| {
        PagesError::Config(format!("failed to parse {}: {error}", config_path.display()))
    })
}

/// `pages` for the default language, `pages.<code>` otherwise.
pub fn language_root_for(language: Option<&str>) -> Result<String> {
    let code = language.map(str::trim).unwrap_or("");
    if code.is_empty() || code.eq_ignore_ascii_case("en") {
        return Ok(DEFAULT_LANGUAGE_ROOT.to_string());
    }
    if code.contains(['/', '\\']) || code.starts_with('.') {
        return Err(PagesError::Config(format!(
            "language code must not contain path separators, got `{code}`"
        )));
    }
    Ok(format!("{DEFAULT_LANGUAGE_ROOT}.{code}"))
}

/// Archive platform directory matching the running OS.
pub fn host_platform() -> &'static str {
    match env::consts::OS {
        "linux" => "linux",
        "macos" => "osx",
        "windows" => "windows",
        "android" => "android",
        "solaris" | "illumos" => "sunos",
        "freebsd" => "freebsd",
        "openbsd" => "openbsd",
        "netbsd" => "netbsd",
        _ => "common",
    }
}

fn default_user_agent() -> String {
    format!("tldr-rust/{}", env!("CARGO_PKG_VERSION"))
}
