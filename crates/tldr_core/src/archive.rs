use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::Settings;
use crate::error::{PagesError, Result};

/// Something that can stream the page archive into a writer.
pub trait ArchiveSource {
    /// Copy the whole archive into `sink`, returning the byte count.
    fn copy_to(&mut self, sink: &mut dyn Write) -> Result<u64>;
}

pub struct HttpArchiveSource {
    client: Client,
    url: String,
    user_agent: String,
}

impl HttpArchiveSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.archive_url,
            &settings.user_agent,
            Duration::from_millis(settings.timeout_ms),
        )
    }

    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| PagesError::Fetch {
                details: format!("failed to build HTTP client: {error}"),
            })?;
        Ok(Self::with_client(client, url, user_agent))
    }

    pub fn with_client(client: Client, url: &str, user_agent: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            user_agent: user_agent.to_string(),
        }
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn copy_to(&mut self, sink: &mut dyn Write) -> Result<u64> {
        let fetch_error = |error: reqwest::Error| PagesError::Fetch {
            details: error.to_string(),
        };
        let mut response = self
            .client
            .get(&self.url)
            .header("User-Agent", self.user_agent.clone())
            .send()
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?;
        response.copy_to(sink).map_err(fetch_error)
    }
}

/// Download the archive into the staging file, replacing any earlier copy.
pub fn fetch_archive(source: &mut dyn ArchiveSource, staging_path: &Path) -> Result<PathBuf> {
    if let Some(parent) = staging_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|error| PagesError::Fetch {
            details: format!("failed to create {}: {error}", parent.display()),
        })?;
    }
    let file = File::create(staging_path).map_err(|error| PagesError::Fetch {
        details: format!(
            "failed to create a temporary file {}: {error}",
            staging_path.display()
        ),
    })?;

    let mut writer = BufWriter::new(file);
    source.copy_to(&mut writer)?;
    writer.flush().map_err(|error| PagesError::Fetch {
        details: format!("failed to write {}: {error}", staging_path.display()),
    })?;
    Ok(staging_path.to_path_buf())
}
