//! # Model Loading
//!
//! Imports Wavefront OBJ geometry together with its MTL material libraries.
//!
//! Loading happens in two phases. The first phase is asynchronous: the OBJ
//! text is fetched, then every library named by an `mtllib` line is fetched
//! and parsed, one after the other. The second phase parses the geometry
//! synchronously against the finished material library, so every `usemtl`
//! can be resolved. Any failure in either phase fails the whole import.
//!
//! ```
//! use tartan::loaders::{MemoryFetcher, ObjLoader};
//!
//! let fetcher = MemoryFetcher::new().with_file(
//!     "tri.obj",
//!     "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
//! );
//! let model = ObjLoader::new(fetcher).load_blocking("tri.obj").unwrap();
//! assert_eq!(model.meshes[0].mesh.triangle_count(), 1);
//! ```

pub mod fetch;
pub mod mtl;
pub mod obj;

use futures::future::{AbortHandle, Abortable, Aborted, FutureExt};
use futures::Future;

pub use fetch::{resolve_relative, FsFetcher, MemoryFetcher, TextFetcher};
pub use mtl::parse_mtl;
pub use obj::{material_libraries, parse_obj, ImportOptions, ImportedMesh, ImportedModel, IndexScope};

use crate::error::ImportError;
use crate::gfx::resources::MaterialLibrary;

/// Loads OBJ models through a [`TextFetcher`].
#[derive(Debug, Clone)]
pub struct ObjLoader<F> {
    fetcher: F,
    options: ImportOptions,
}

impl<F: TextFetcher> ObjLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches and parses `path` and its material libraries. Library names
    /// are resolved relative to the directory of `path`.
    pub async fn load(&self, path: &str) -> Result<ImportedModel, ImportError> {
        let source = self.fetcher.fetch_text(path).await?;

        let mut materials = MaterialLibrary::new();
        for library in material_libraries(&source) {
            let library_path = resolve_relative(path, &library);
            let text = self.fetcher.fetch_text(&library_path).await?;
            let parsed = parse_mtl(&text)?;
            log::debug!("Loaded {} material(s) from {}", parsed.len(), library_path);
            materials.merge(parsed);
        }

        let model = parse_obj(&source, materials, &self.options)?;
        log::info!(
            "Imported {}: {} mesh(es), {} material(s)",
            path,
            model.meshes.len(),
            model.materials.len()
        );
        Ok(model)
    }

    /// Like [`ObjLoader::load`], paired with a handle that cancels the import.
    /// An aborted import resolves to [`ImportError::Aborted`].
    pub fn load_abortable<'a>(
        &'a self,
        path: &'a str,
    ) -> (impl Future<Output = Result<ImportedModel, ImportError>> + 'a, AbortHandle) {
        let (handle, registration) = AbortHandle::new_pair();
        let future = Abortable::new(self.load(path), registration).map(move |result| match result {
            Ok(import) => import,
            Err(Aborted) => {
                log::info!("Import of {} aborted", path);
                Err(ImportError::Aborted)
            }
        });
        (future, handle)
    }

    /// Runs [`ObjLoader::load`] to completion on the current thread.
    pub fn load_blocking(&self, path: &str) -> Result<ImportedModel, ImportError> {
        pollster::block_on(self.load(path))
    }
}
