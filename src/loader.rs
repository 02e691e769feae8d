//! The loader facade: controllers, then middleware, then models.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{Config, Options};
use crate::controller::{Binder, Bound};
use crate::error::Result;
use crate::host::{Host, Resource};
use crate::middleware::{MidTables, Resolver};
use crate::model::{Registered, Registrar};
use crate::module::ModuleLoader;
use crate::scan::{LoadResult, Scanner};

/// What [`Loader::init`] did.
#[derive(Debug, Default)]
pub struct Report {
    pub routes: usize,
    pub controllers: usize,
    pub skipped_controllers: Vec<(PathBuf, String)>,
    pub middleware: usize,
    pub models: usize,
    pub skipped_models: Vec<(PathBuf, String)>,
}

/// Binds an application directory tree onto a [`Host`].
///
/// ```rust,no_run
/// use tsu_loader::{Loader, Options, Registry, Router};
///
/// # fn main() -> Result<(), tsu_loader::Error> {
/// let modules = Registry::with_root("/srv/app");
/// let loader = Loader::new(Options::default().app_path("/srv/app"), modules)?;
///
/// let mut app = Router::new();
/// let report = loader.init(&mut app)?;
/// println!("{} routes", report.routes);
/// # Ok(())
/// # }
/// ```
pub struct Loader<L> {
    config: Config,
    modules: L,
    resource: Option<Resource>,
}

impl<L: ModuleLoader> Loader<L> {
    /// Resolves `options` and creates any missing directory.
    pub fn new(options: Options, modules: L) -> Result<Self> {
        let config = Config::resolve(options)?;
        debug!(
            controller = %config.controller_path.display(),
            middleware = %config.midware_path.display(),
            model = %config.model_path.display(),
            "loader configured"
        );
        Ok(Self { config, modules, resource: None })
    }

    /// The handle every model constructor receives. Dropped when models are disabled.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        if self.config.load_model {
            self.resource = Some(resource);
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every stage against `host`.
    pub fn init<H: Host + ?Sized>(&self, host: &mut H) -> Result<Report> {
        let mut scanned = self.scan()?;
        let bound = self.load_controllers(host, &mut scanned)?;
        let middleware = self.load_middleware(host, &scanned.tables)?;
        let registered = if self.config.load_model {
            self.load_models(host)
        } else {
            Registered::default()
        };

        let report = Report {
            routes: bound.routes,
            controllers: bound.controllers,
            skipped_controllers: bound.skipped,
            middleware,
            models: registered.models,
            skipped_models: registered.skipped,
        };
        info!(
            routes = report.routes,
            middleware = report.middleware,
            models = report.models,
            "application loaded"
        );
        Ok(report)
    }

    /// Walks the controller directory.
    pub fn scan(&self) -> Result<LoadResult> {
        Scanner::new(&self.modules, &self.config.extension)
            .subgroup(self.config.subgroup.as_deref())
            .scan(&self.config.controller_path)
    }

    /// Binds every scanned controller, adding file-tier middleware to `scanned.tables`.
    pub fn load_controllers<H: Host + ?Sized>(
        &self,
        host: &mut H,
        scanned: &mut LoadResult,
    ) -> Result<Bound> {
        Binder::new(&self.modules)
            .post_args(self.config.post_args)
            .fail_fast(self.config.fail_fast)
            .bind_all(host, &scanned.routes, &mut scanned.tables)
    }

    pub fn load_middleware<H: Host + ?Sized>(&self, host: &mut H, tables: &MidTables) -> Result<usize> {
        Resolver::new(&self.modules, &self.config.midware_path).attach(host, tables)
    }

    pub fn load_models<H: Host + ?Sized>(&self, host: &mut H) -> Registered {
        Registrar::new(&self.modules, &self.config.extension, &self.config.mname)
            .resource(self.resource.as_ref())
            .register(host, &self.config.model_path)
    }
}
