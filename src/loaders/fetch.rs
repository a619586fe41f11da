//! Asynchronous text retrieval for models, material files and shaders.

use std::collections::HashMap;
use std::path::PathBuf;

use futures::future::{BoxFuture, FutureExt};

use crate::error::FetchError;

/// Delivers the text behind a path. The path syntax is up to the
/// implementation: a file system path, a URL, an archive entry.
pub trait TextFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;
}

impl<T: TextFetcher + ?Sized> TextFetcher for &T {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        (**self).fetch_text(path)
    }
}

/// Reads files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TextFetcher for FsFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            let full_path = self.root.join(path);
            log::debug!("Reading {}", full_path.display());
            std::fs::read_to_string(&full_path).map_err(|e| FetchError::new(path, e.to_string()))
        }
        .boxed()
    }
}

/// Serves text from an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: &str, contents: &str) {
        self.files.insert(path.to_string(), contents.to_string());
    }
}

impl TextFetcher for MemoryFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        let result = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::new(path, "no such file"));
        futures::future::ready(result).boxed()
    }
}

/// Resolves `name` against the directory of `base`, using `/` separators.
///
/// `resolve_relative("models/ship.obj", "ship.mtl")` is `"models/ship.mtl"`;
/// a base without a directory leaves `name` untouched.
pub fn resolve_relative(base: &str, name: &str) -> String {
    match base.rfind('/') {
        Some(slash) => format!("{}/{}", &base[..slash], name),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative("models/ship.obj", "ship.mtl"), "models/ship.mtl");
        assert_eq!(resolve_relative("a/b/c.obj", "d.mtl"), "a/b/d.mtl");
        assert_eq!(resolve_relative("ship.obj", "ship.mtl"), "ship.mtl");
    }

    #[test]
    fn test_memory_fetcher() {
        let fetcher = MemoryFetcher::new().with_file("a.txt", "hello");
        assert_eq!(block_on(fetcher.fetch_text("a.txt")).expect("present"), "hello");

        let err = block_on(fetcher.fetch_text("b.txt")).unwrap_err();
        assert_eq!(err.path, "b.txt");
    }

    #[test]
    fn test_fs_fetcher_reports_missing_files() {
        let fetcher = FsFetcher::new(std::env::temp_dir());
        let err = block_on(fetcher.fetch_text("tartan-does-not-exist.obj")).unwrap_err();
        assert_eq!(err.path, "tartan-does-not-exist.obj");
        assert!(!err.reason.is_empty());
    }
}
