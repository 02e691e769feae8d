//! Bringing modules into memory.
//!
//! The loader discovers *files*; turning a file into a controller, a
//! middleware, a model or a descriptor list is delegated to a
//! [`ModuleLoader`]. [`Registry`] is the in-memory implementation: the
//! application registers a factory per path at startup, before
//! [`Loader::init`](crate::Loader::init) walks the tree.

use std::any::Any;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::controller::Controller;
use crate::error::{BoxError, Error, Result};
use crate::host::{Resource, Service};
use crate::middleware::{BoxedMiddleware, Middleware};

/// Builds a controller instance. Controllers take no constructor arguments.
pub type ControllerFactory = Arc<dyn Fn() -> Result<Arc<dyn Controller>, BoxError> + Send + Sync>;

/// Builds a class-style middleware from the descriptor's `args`.
pub type MiddlewareFactory =
    Arc<dyn Fn(Option<&Value>) -> Result<BoxedMiddleware, BoxError> + Send + Sync>;

/// Builds a model from the shared resource handle.
pub type ModelFactory = Arc<dyn Fn(Option<&Resource>) -> Result<Service, BoxError> + Send + Sync>;

/// What a path resolves to.
#[derive(Clone)]
pub enum Module {
    Controller(ControllerFactory),
    /// Plain data, as exported by `__mid` files.
    Exports(Value),
    Middleware(BoxedMiddleware),
    MiddlewareClass(MiddlewareFactory),
    Model(ModelFactory),
}

impl Module {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Controller(_)      => "a controller",
            Self::Exports(_)         => "an export list",
            Self::Middleware(_)      => "a middleware",
            Self::MiddlewareClass(_) => "a middleware class",
            Self::Model(_)           => "a model",
        }
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exports(v) => f.debug_tuple("Exports").field(v).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

/// Resolves a discovered path to a [`Module`].
///
/// Paths are absolute: controller, model and `__mid` files arrive with their
/// extension, middleware arrives as `<midware_path>/<name>` without one.
pub trait ModuleLoader {
    fn load(&self, path: &Path) -> Result<Module>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    fn load(&self, path: &Path) -> Result<Module> {
        (**self).load(path)
    }
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for Arc<L> {
    fn load(&self, path: &Path) -> Result<Module> {
        (**self).load(path)
    }
}

/// In-memory path → module table.
///
/// Keys ignore the module extension (`rs` unless [`Registry::extension`] says
/// otherwise), so `middleware/auth` and `middleware/auth.rs` are the same
/// module. Any other dotted suffix is part of the name: `jwt.v2` and `jwt`
/// are different modules. Relative keys are resolved against the root given
/// to [`Registry::with_root`].
///
/// ```rust
/// use tsu_loader::Registry;
/// use serde_json::json;
///
/// let registry = Registry::with_root("/srv/app")
///     .exports("controller/__mid.rs", json!([{ "name": "@auth" }]));
/// # let _ = registry;
/// ```
#[derive(Clone, Debug)]
pub struct Registry {
    root: Option<PathBuf>,
    extension: String,
    modules: HashMap<PathBuf, Module>,
}

impl Default for Registry {
    fn default() -> Self {
        Self { root: None, extension: "rs".to_owned(), modules: HashMap::new() }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()), ..Self::default() }
    }

    /// The module file extension, matching `Options::extension`. Set it
    /// before registering: keys are computed on insert.
    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_owned();
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, module: Module) {
        let key = self.key(path.as_ref());
        self.modules.insert(key, module);
    }

    pub fn controller<C, F>(mut self, path: impl AsRef<Path>, factory: F) -> Self
    where
        C: Controller,
        F: Fn() -> Result<C, BoxError> + Send + Sync + 'static,
    {
        let factory: ControllerFactory =
            Arc::new(move || factory().map(|c| Arc::new(c) as Arc<dyn Controller>));
        self.insert(path, Module::Controller(factory));
        self
    }

    pub fn exports(mut self, path: impl AsRef<Path>, exports: Value) -> Self {
        self.insert(path, Module::Exports(exports));
        self
    }

    pub fn middleware(mut self, path: impl AsRef<Path>, middleware: impl Middleware) -> Self {
        self.insert(path, Module::Middleware(Arc::new(middleware)));
        self
    }

    pub fn middleware_class<M, F>(mut self, path: impl AsRef<Path>, factory: F) -> Self
    where
        M: Middleware,
        F: Fn(Option<&Value>) -> Result<M, BoxError> + Send + Sync + 'static,
    {
        let factory: MiddlewareFactory =
            Arc::new(move |args| factory(args).map(|m| Arc::new(m) as BoxedMiddleware));
        self.insert(path, Module::MiddlewareClass(factory));
        self
    }

    pub fn model<T, F>(mut self, path: impl AsRef<Path>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Option<&Resource>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let factory: ModelFactory =
            Arc::new(move |res| factory(res).map(|m| Arc::new(m) as Service));
        self.insert(path, Module::Model(factory));
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn key(&self, path: &Path) -> PathBuf {
        let full = match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        };
        match full.extension().and_then(OsStr::to_str) {
            Some(ext) if ext == self.extension => full.with_extension(""),
            _ => full,
        }
    }
}

impl ModuleLoader for Registry {
    fn load(&self, path: &Path) -> Result<Module> {
        self.modules
            .get(&self.key(path))
            .cloned()
            .ok_or_else(|| Error::ModuleNotFound { path: path.to_path_buf() })
    }
}
