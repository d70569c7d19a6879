use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use iced::widget::image::Handle;

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Poster,
    Backdrop,
    Still,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Poster => "w500",
            ImageSize::Backdrop => "w780",
            ImageSize::Still => "w300",
            ImageSize::Original => "original",
        }
    }
}

/// Turns a TMDB image path into an absolute URL. `size` is passed through
/// as the path segment without validation.
pub fn resolve_image_url(path: Option<&str>, size: &str) -> String {
    let path = match path.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return String::from(PLACEHOLDER_IMAGE),
    };

    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    if path.starts_with('/') {
        format!("{}/{}{}", IMAGE_BASE_URL, size, path)
    } else {
        format!("{}/{}/{}", IMAGE_BASE_URL, size, path)
    }
}

pub fn image_url(path: Option<&str>, size: ImageSize) -> String {
    resolve_image_url(path, size.as_str())
}

pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn simple_hash(s: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    format!("{:016x}", hash)
}

fn get_cache_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".cache")
            .join("donghua")
            .join("images")
    })
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    cache: HashMap<String, Handle>,
    pending: HashSet<String>,
    cache_directory: Option<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        let cache_directory = get_cache_dir();
        if let Some(ref dir) = cache_directory {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("could not create image cache {}: {}", dir.display(), e);
            }
        }
        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            cache_directory,
        }
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.cache.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.pending.remove(&url);
        self.cache.insert(url, handle);
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.pending.insert(url);
    }

    pub fn clear_pending(&mut self, url: &str) {
        self.pending.remove(url);
    }

    /// True when `url` is worth a download: remote, not cached, not in flight.
    pub fn needs_load(&self, url: &str) -> bool {
        is_remote(url) && self.get(url).is_none() && !self.is_pending(url)
    }

    pub fn get_cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_directory
            .as_ref()
            .map(|dir| dir.join(simple_hash(url)))
    }
}
