// Turning image and emoji references into files the canvas can place

use crate::config::RenderOptions;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Upper bound for one remote image download.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("mdpaint/", env!("CARGO_PKG_VERSION"));

/// Resolves a document reference to a local file.
pub trait ResourceResolver {
    fn resolve(&self, destination: &str) -> Result<PathBuf>;
}

pub fn is_remote(destination: &str) -> bool {
    destination.starts_with("http://") || destination.starts_with("https://")
}

/// Prefix a relative link destination with the document's base URL.
///
/// Absolute URLs and `#anchor` links are returned unchanged.
pub fn absolutize_link(destination: &str, base_url: Option<&str>) -> String {
    match base_url {
        Some(base)
            if !base.is_empty()
                && !destination.starts_with("http")
                && !destination.starts_with('#') =>
        {
            let relative = destination.replacen("./", "", 1);
            format!("{}/{}", base.trim_end_matches('/'), relative)
        }
        _ => destination.to_string(),
    }
}

/// Filesystem resolver.
///
/// Relative paths are looked up below `base_dir`. Remote references, and
/// relative references of documents loaded from a URL, are not fetched and
/// fail with [`Error::RemoteFetch`] naming the URL to fetch.
#[derive(Clone, Debug, Default)]
pub struct FsResolver {
    base_dir: Option<PathBuf>,
    base_url: Option<String>,
}

impl FsResolver {
    pub fn new(base_dir: Option<PathBuf>, base_url: Option<String>) -> Self {
        FsResolver { base_dir, base_url }
    }

    fn local_path(&self, destination: &str) -> PathBuf {
        let path = Path::new(destination);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceResolver for FsResolver {
    fn resolve(&self, destination: &str) -> Result<PathBuf> {
        if is_remote(destination) {
            return Err(Error::RemoteFetch {
                url: destination.to_string(),
                reason: "remote resources are not downloaded".to_string(),
            });
        }

        let path = self.local_path(destination);
        if path.is_file() {
            return Ok(path);
        }

        match &self.base_url {
            Some(base) => Err(Error::RemoteFetch {
                url: absolutize_link(destination, Some(base)),
                reason: "remote resources are not downloaded".to_string(),
            }),
            None => Err(Error::ResourceNotFound(path.display().to_string())),
        }
    }
}

/// The resolver `options` ask for: downloading unless remote fetching is off.
pub fn resolver_for(options: &RenderOptions) -> Result<Box<dyn ResourceResolver>> {
    let (base_dir, base_url) = (options.base_dir.clone(), options.base_url.clone());
    if options.fetch_remote {
        Ok(Box::new(FetchingResolver::new(base_dir, base_url)?))
    } else {
        Ok(Box::new(FsResolver::new(base_dir, base_url)))
    }
}

/// Resolver that downloads what the filesystem cannot provide.
///
/// Downloads land in a temporary directory owned by the resolver and are
/// removed when it is dropped. A URL is fetched at most once.
pub struct FetchingResolver {
    local: FsResolver,
    client: Client,
    downloads: TempDir,
    fetched: RefCell<HashMap<String, PathBuf>>,
}

impl FetchingResolver {
    pub fn new(base_dir: Option<PathBuf>, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(io::Error::other)?;
        Self::with_client(base_dir, base_url, client)
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(
        base_dir: Option<PathBuf>,
        base_url: Option<String>,
        client: Client,
    ) -> Result<Self> {
        let downloads = tempfile::Builder::new().prefix("mdpaint-").tempdir()?;
        Ok(FetchingResolver {
            local: FsResolver::new(base_dir, base_url),
            client,
            downloads,
            fetched: RefCell::new(HashMap::new()),
        })
    }

    /// Download `url` into the temporary directory.
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        if let Some(path) = self.fetched.borrow().get(url) {
            return Ok(path.clone());
        }
        let failed = |reason: String| Error::RemoteFetch {
            url: url.to_string(),
            reason,
        };

        log::info!("Fetching {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| failed(e.to_string()))?;
        if response.status() != StatusCode::OK {
            return Err(failed(format!("HTTP {}", response.status().as_u16())));
        }
        let bytes = response.bytes().map_err(|e| failed(e.to_string()))?;

        let mut file = tempfile::Builder::new()
            .suffix(&download_suffix(url))
            .tempfile_in(self.downloads.path())?;
        file.write_all(&bytes)?;
        let path = file.into_temp_path().keep().map_err(|e| e.error)?;
        log::debug!("Downloaded {url} to {} ({} bytes)", path.display(), bytes.len());

        self.fetched
            .borrow_mut()
            .insert(url.to_string(), path.clone());
        Ok(path)
    }
}

impl ResourceResolver for FetchingResolver {
    fn resolve(&self, destination: &str) -> Result<PathBuf> {
        match self.local.resolve(destination) {
            Err(Error::RemoteFetch { url, .. }) => self.fetch(&url),
            resolved => resolved,
        }
    }
}

/// File name suffix of a download: the extension of the last URL segment.
fn download_suffix(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    match Path::new(name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!(".{ext}"),
        None => String::new(),
    }
}
