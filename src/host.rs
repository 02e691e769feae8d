//! The host application seam.
//!
//! The loader only ever *registers*: routes, middleware and services. Request
//! matching, middleware execution and serving belong to whatever implements
//! [`Host`]. [`Router`](crate::Router) is the reference implementation.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::middleware::BoxedMiddleware;

/// A published model instance.
pub type Service = Arc<dyn Any + Send + Sync>;

/// The shared handle passed to every model constructor (a pool, a client…).
pub type Resource = Arc<dyn Any + Send + Sync>;

/// Registration options for one route.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteOptions {
    pub name: String,
    pub group: String,
}

/// The scope a middleware registration came from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Tier {
    Global,
    Group,
    File,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Global => "global",
            Self::Group  => "group",
            Self::File   => "file",
        })
    }
}

/// Registration options for one middleware.
///
/// Empty `methods` means every method; `None` group means every group; empty
/// `names` means the middleware is not narrowed to specific routes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MidOptions {
    pub tier: Tier,
    /// The descriptor name the middleware was resolved from. Diagnostic only.
    pub source: String,
    pub methods: Vec<Method>,
    pub group: Option<String>,
    pub names: Vec<String>,
    /// Run before the host's normal-stage pipeline.
    pub pre: bool,
}

impl MidOptions {
    pub(crate) fn new(tier: Tier, source: &str) -> Self {
        Self {
            tier,
            source: source.to_owned(),
            methods: Vec::new(),
            group: None,
            names: Vec::new(),
            pre: false,
        }
    }
}

/// Namespaced service registry. Models are published as
/// `services[namespace][model_name]`.
#[derive(Default)]
pub struct Services {
    namespaces: HashMap<String, HashMap<String, Service>>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the namespace, creating it when absent.
    pub fn namespace_mut(&mut self, namespace: &str) -> &mut HashMap<String, Service> {
        self.namespaces.entry(namespace.to_owned()).or_default()
    }

    pub fn namespace(&self, namespace: &str) -> Option<&HashMap<String, Service>> {
        self.namespaces.get(namespace)
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<&Service> {
        self.namespaces.get(namespace)?.get(name)
    }

    /// Typed lookup: `services.get_as::<UserModel>("model", "user")`.
    pub fn get_as<T: Any + Send + Sync>(&self, namespace: &str, name: &str) -> Option<Arc<T>> {
        Arc::clone(self.get(namespace, name)?).downcast::<T>().ok()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (ns, entries) in &self.namespaces {
            let mut names: Vec<&str> = entries.keys().map(String::as_str).collect();
            names.sort_unstable();
            map.entry(ns, &names);
        }
        map.finish()
    }
}

/// What the loader needs from the application it wires up.
pub trait Host {
    /// Verbs this host can route.
    fn methods(&self) -> &[Method];

    /// Validates a registration without making it.
    ///
    /// The binder checks every route of a controller before registering any
    /// of them, so a controller is either bound whole or not at all. Hosts
    /// that cannot tell in advance keep the default; a later `route` failure
    /// then leaves the controller partially bound, with its file middleware
    /// still attached.
    fn check_route(&self, _method: Method, _path: &str, _opts: &RouteOptions) -> Result<()> {
        Ok(())
    }

    /// Registers `handler` for `method` + `path`. Paths use `:name` placeholders.
    fn route(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxedHandler,
        opts: RouteOptions,
    ) -> Result<()>;

    /// Appends a middleware to the host's chain. Call order is chain order.
    fn use_middleware(&mut self, middleware: BoxedMiddleware, opts: MidOptions) -> Result<()>;

    fn services(&mut self) -> &mut Services;
}
