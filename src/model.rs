//! Model registrar.
//!
//! Every module file directly inside the model directory is instantiated with
//! the shared resource handle and published as `services[mname][stem]`.
//! Nothing here is fatal: a model that fails is logged and left out.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::host::{Host, Resource, Service};
use crate::module::{Module, ModuleLoader};
use crate::scan::module_stem;

/// Outcome of the model stage.
#[derive(Debug, Default)]
pub struct Registered {
    pub models: usize,
    pub skipped: Vec<(PathBuf, String)>,
}

pub struct Registrar<'a, L: ?Sized> {
    loader: &'a L,
    extension: &'a str,
    namespace: &'a str,
    resource: Option<&'a Resource>,
}

impl<'a, L: ModuleLoader + ?Sized> Registrar<'a, L> {
    pub fn new(loader: &'a L, extension: &'a str, namespace: &'a str) -> Self {
        Self { loader, extension, namespace, resource: None }
    }

    pub fn resource(mut self, resource: Option<&'a Resource>) -> Self {
        self.resource = resource;
        self
    }

    pub fn register<H: Host + ?Sized>(&self, host: &mut H, dir: &Path) -> Registered {
        let mut out = Registered::default();
        host.services().namespace_mut(self.namespace);

        let files = match model_files(dir, self.extension) {
            Ok(files) => files,
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "model directory unreadable");
                out.skipped.push((dir.to_path_buf(), e.to_string()));
                return out;
            }
        };

        for (path, stem) in files {
            match self.instantiate(&path) {
                Ok(model) => {
                    debug!(namespace = %self.namespace, model = %stem, "model");
                    host.services().namespace_mut(self.namespace).insert(stem, model);
                    out.models += 1;
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "model skipped");
                    out.skipped.push((path, e.to_string()));
                }
            }
        }

        info!(namespace = %self.namespace, models = out.models, skipped = out.skipped.len(), "models registered");
        out
    }

    fn instantiate(&self, path: &Path) -> Result<Service> {
        match self.loader.load(path)? {
            Module::Model(factory) => factory(self.resource).map_err(|source| Error::Instantiate {
                path: path.to_path_buf(),
                source,
            }),
            other => Err(Error::ModuleKind {
                path: path.to_path_buf(),
                expected: "a model",
                found: other.kind(),
            }),
        }
    }
}

/// Eligible files directly in `dir`, sorted, with their stems.
fn model_files(dir: &Path, extension: &str) -> Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let is_file = entry.file_type().map_err(|e| Error::io(entry.path(), e))?.is_file();
        let stem = entry
            .file_name()
            .to_str()
            .and_then(|name| module_stem(name, extension))
            .map(str::to_owned);
        if let (true, Some(stem)) = (is_file, stem) {
            files.push((entry.path(), stem));
        }
    }
    files.sort();
    Ok(files)
}
