//! Artifact fetcher backed by a local cache directory.
//!
//! Artifacts land in `<cache_dir>/<id with '/' replaced by "--">/<role>/`,
//! where role is `checkpoint`, `config` or `vocoder`, so two roles sharing a
//! file name never overwrite each other.
//!
//! Locations are plain paths, `file://` URLs or `http(s)://` URLs. Local files
//! already cached with the expected size are reused, as are downloaded files
//! already present. New files are written to a unique temp file and renamed
//! into place, so concurrent or repeated fetches of the same id never observe
//! a partial file.

use cantus_core::{ArtifactFetcher, ArtifactLocations, FetchError, ModelArtifacts, ModelId};
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::Url;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const FILE_SCHEME: &str = "file://";

/// Checkpoints can be large.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(3600);

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

enum Source {
    Local(PathBuf),
    Remote(Url),
}

#[derive(Debug)]
pub struct CacheFetcher {
    cache_dir: PathBuf,
    client: Mutex<Option<Client>>,
}

impl CacheFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            client: Mutex::new(None),
        }
    }

    /// Use `client` for HTTP downloads instead of building one on first use.
    pub fn with_client(self, client: Client) -> Self {
        Self {
            client: Mutex::new(Some(client)),
            ..self
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory holding the cached artifacts for `id`.
    pub fn model_dir(&self, id: &ModelId) -> PathBuf {
        self.cache_dir.join(id.cache_dir_name())
    }

    fn client(&self, url: &Url) -> Result<Client, FetchError> {
        let mut slot = self.client.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| transport(url, e))?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn materialize(&self, dir: &Path, role: &str, location: &str) -> Result<PathBuf, FetchError> {
        let dir = dir.join(role);
        match parse_location(location)? {
            Source::Local(path) => self.copy_local(&dir, &path, location),
            Source::Remote(url) => self.download(&dir, &url),
        }
    }

    fn copy_local(&self, dir: &Path, source: &Path, location: &str) -> Result<PathBuf, FetchError> {
        let meta = match fs::metadata(source) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(FetchError::MissingSource(source.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::MissingSource(source.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FetchError::UnsupportedLocation(location.to_string()))?;
        let dest = dir.join(file_name);

        if let Ok(existing) = fs::metadata(&dest) {
            if existing.is_file() && existing.len() == meta.len() {
                tracing::debug!(path = %dest.display(), "artifact already cached");
                return Ok(dest);
            }
        }

        fs::create_dir_all(dir)?;
        write_atomically(dir, file_name, &dest, |temp| {
            fs::copy(source, temp)?;
            Ok(())
        })?;

        tracing::debug!(from = %source.display(), to = %dest.display(), bytes = meta.len(), "artifact fetched");
        Ok(dest)
    }

    fn download(&self, dir: &Path, url: &Url) -> Result<PathBuf, FetchError> {
        let file_name = url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| FetchError::UnsupportedLocation(url.to_string()))?;
        let dest = dir.join(file_name);

        if dest.is_file() {
            tracing::debug!(path = %dest.display(), "artifact already downloaded");
            return Ok(dest);
        }

        let mut response = self
            .client(url)?
            .get(url.clone())
            .send()
            .map_err(|e| transport(url, e))?;
        if !response.status().is_success() {
            return Err(FetchError::Transport {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        fs::create_dir_all(dir)?;
        let mut bytes = 0;
        write_atomically(dir, file_name, &dest, |temp| {
            let mut file = File::create(temp)?;
            bytes = response.copy_to(&mut file).map_err(|e| transport(url, e))?;
            file.sync_all()?;
            Ok(())
        })?;

        tracing::info!(url = %url, to = %dest.display(), bytes, "artifact downloaded");
        Ok(dest)
    }
}

fn transport(url: &Url, e: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

/// Fill a unique temp file next to `dest` and rename it into place.
fn write_atomically(
    dir: &Path,
    file_name: &str,
    dest: &Path,
    fill: impl FnOnce(&Path) -> Result<(), FetchError>,
) -> Result<(), FetchError> {
    let temp = dir.join(format!(
        ".{}.{}.{}.part",
        file_name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let result = fill(&temp).and_then(|()| fs::rename(&temp, dest).map_err(FetchError::from));
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

fn parse_location(location: &str) -> Result<Source, FetchError> {
    if let Some(rest) = location.strip_prefix(FILE_SCHEME) {
        return Ok(Source::Local(PathBuf::from(rest)));
    }
    if location.starts_with("http://") || location.starts_with("https://") {
        return Url::parse(location)
            .map(Source::Remote)
            .map_err(|_| FetchError::UnsupportedLocation(location.to_string()));
    }
    if location.contains("://") {
        return Err(FetchError::UnsupportedLocation(location.to_string()));
    }
    Ok(Source::Local(PathBuf::from(location)))
}

impl ArtifactFetcher for CacheFetcher {
    fn fetch(
        &self,
        id: &ModelId,
        locations: &ArtifactLocations,
    ) -> Result<ModelArtifacts, FetchError> {
        let dir = self.model_dir(id);

        let checkpoint = self.materialize(&dir, "checkpoint", &locations.checkpoint)?;
        let config = self.materialize(&dir, "config", &locations.config)?;
        let vocoder = locations
            .vocoder
            .as_deref()
            .map(|v| self.materialize(&dir, "vocoder", v))
            .transpose()?;

        Ok(ModelArtifacts::new(checkpoint, config, vocoder))
    }
}
