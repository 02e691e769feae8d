//! Controllers and the binder that turns them into routes.
//!
//! A controller is dispatched in one of two modes, decided once per instance:
//!
//! | Mode | Routes |
//! |---|---|
//! | [`Mode::Restful`] | one per exposed [`Verb`]: `list`/`post` on the bare file group, the rest on `file_group + param` |
//! | [`Mode::Callback`] | one `callback` route on the file group, plus optional named sub-routes |
//!
//! Which verbs a RESTful controller serves is a capability set ([`Verbs`]),
//! not a naming convention checked at runtime.

use std::path::PathBuf;
use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::handler::{BoxFuture, Handler};
use crate::host::{Host, RouteOptions};
use crate::method::Method;
use crate::middleware::{FileMid, MidTables, MiddlewareDescriptor};
use crate::module::{Module, ModuleLoader};
use crate::request::Request;
use crate::scan::RouteFile;

const DEFAULT_PARAM: &str = "/:id";

/// How a controller maps onto routes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    #[default]
    Restful,
    Callback,
}

/// RESTful action names.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Verb {
    Get,
    List,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Verb {
    /// Registration order.
    pub const ALL: [Verb; 7] = [
        Self::Post,
        Self::Delete,
        Self::Put,
        Self::Get,
        Self::List,
        Self::Patch,
        Self::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get     => "get",
            Self::List    => "list",
            Self::Post    => "post",
            Self::Put     => "put",
            Self::Delete  => "delete",
            Self::Patch   => "patch",
            Self::Options => "options",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::Get | Self::List => Method::Get,
            Self::Post             => Method::Post,
            Self::Put              => Method::Put,
            Self::Delete           => Method::Delete,
            Self::Patch            => Method::Patch,
            Self::Options          => Method::Options,
        }
    }

    pub fn flag(self) -> Verbs {
        match self {
            Self::Get     => Verbs::GET,
            Self::List    => Verbs::LIST,
            Self::Post    => Verbs::POST,
            Self::Put     => Verbs::PUT,
            Self::Delete  => Verbs::DELETE,
            Self::Patch   => Verbs::PATCH,
            Self::Options => Verbs::OPTIONS,
        }
    }

    /// Whether the route carries the id parameter.
    fn takes_param(self, post_args: bool) -> bool {
        match self {
            Self::List => false,
            Self::Post => post_args,
            _ => true,
        }
    }
}

bitflags! {
    /// The RESTful actions a controller exposes.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Verbs: u8 {
        const GET     = 1 << 0;
        const LIST    = 1 << 1;
        const POST    = 1 << 2;
        const PUT     = 1 << 3;
        const DELETE  = 1 << 4;
        const PATCH   = 1 << 5;
        const OPTIONS = 1 << 6;
    }
}

/// The function a route is bound to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    Verb(Verb),
    Callback,
    /// A sub-route from [`Controller::router`].
    Named(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Verb(v)  => v.as_str(),
            Self::Callback => "callback",
            Self::Named(n) => n,
        }
    }
}

/// A controller instance.
///
/// Everything but [`call`](Controller::call) has a default, so a RESTful
/// controller usually overrides `verbs` and `call` and nothing else.
///
/// ```rust
/// use tsu_loader::{Action, BoxFuture, Controller, Request, Response, Verb, Verbs};
///
/// struct Content;
///
/// impl Controller for Content {
///     fn verbs(&self) -> Verbs { Verbs::GET | Verbs::LIST }
///
///     fn call(&self, action: &Action, req: Request) -> BoxFuture {
///         let body = match action {
///             Action::Verb(Verb::Get) => format!("content {}", req.param("id").unwrap_or("?")),
///             _ => "all content".to_owned(),
///         };
///         Box::pin(async move { Response::text(body) })
///     }
/// }
/// ```
pub trait Controller: Send + Sync + 'static {
    fn mode(&self) -> Mode {
        Mode::Restful
    }

    /// Verb of the callback route. Ignored in RESTful mode.
    fn method(&self) -> Method {
        Method::Get
    }

    /// Route parameter appended to id-carrying RESTful routes. `None` means `/:id`.
    fn param(&self) -> Option<&str> {
        None
    }

    fn verbs(&self) -> Verbs {
        Verbs::empty()
    }

    /// Whether a [`router`](Controller::router) key has a function behind it.
    fn handles(&self, _name: &str) -> bool {
        false
    }

    /// Overrides the default route name for `action`.
    fn route_name(&self, _action: &Action) -> Option<String> {
        None
    }

    /// Callback-mode sub-routes: `(key, verb)` registers `file_group/key`.
    fn router(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// File-scoped middleware.
    fn mid(&self) -> Option<Vec<MiddlewareDescriptor>> {
        None
    }

    fn call(&self, action: &Action, req: Request) -> BoxFuture;
}

/// One route a controller will register.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutePlan {
    pub method: Method,
    pub path: String,
    pub name: String,
    pub group: String,
    pub action: Action,
}

/// Works out the routes for `controller` without touching a host.
///
/// `methods` is the host's supported verb set; callback and router-map
/// entries outside it are dropped with a warning.
pub fn plan_routes(
    file: &RouteFile,
    controller: &dyn Controller,
    post_args: bool,
    methods: &[Method],
) -> Vec<RoutePlan> {
    let plan = |method: Method, path: String, action: Action, default_name: String| RoutePlan {
        method,
        path,
        name: controller.route_name(&action).unwrap_or(default_name),
        group: file.dir_group.clone(),
        action,
    };

    match controller.mode() {
        Mode::Restful => {
            let param = route_param(controller.param());
            let verbs = controller.verbs();
            Verb::ALL
                .into_iter()
                .filter(|v| verbs.contains(v.flag()))
                .map(|v| {
                    let path = if v.takes_param(post_args) {
                        format!("{}{param}", file.file_group)
                    } else {
                        file.file_group.clone()
                    };
                    plan(v.method(), path, Action::Verb(v), format!("{}/{}", file.file_group, v.as_str()))
                })
                .collect()
        }
        Mode::Callback => {
            let mut routes = Vec::new();
            let method = controller.method();
            if methods.contains(&method) {
                routes.push(plan(method, file.file_group.clone(), Action::Callback, file.file_group.clone()));
            } else {
                warn!(file = %file.file_group, %method, "callback method not supported by host, route skipped");
            }

            for (key, verb) in controller.router() {
                if !controller.handles(&key) {
                    warn!(file = %file.file_group, key = %key, "router entry has no function behind it");
                    continue;
                }
                let method = match Method::parse_loose(&verb) {
                    Ok(m) if methods.contains(&m) => m,
                    _ => {
                        warn!(file = %file.file_group, key = %key, verb = %verb, "router entry method not supported by host");
                        continue;
                    }
                };
                let path = format!("{}/{key}", file.file_group);
                routes.push(plan(method, path.clone(), Action::Named(key), path));
            }
            routes
        }
    }
}

impl RoutePlan {
    pub fn options(&self) -> RouteOptions {
        RouteOptions { name: self.name.clone(), group: self.group.clone() }
    }
}

/// Rejects a plan that collides with itself: a repeated name within a group,
/// or the same method and path twice.
pub fn check_plans(plans: &[RoutePlan]) -> Result<()> {
    for (i, plan) in plans.iter().enumerate() {
        for earlier in &plans[..i] {
            if earlier.group == plan.group && earlier.name == plan.name {
                return Err(Error::DuplicateName { name: plan.name.clone(), group: plan.group.clone() });
            }
            if earlier.method == plan.method && earlier.path == plan.path {
                return Err(Error::Route {
                    path: plan.path.clone(),
                    reason: format!("{} planned twice", plan.method),
                });
            }
        }
    }
    Ok(())
}

fn route_param(param: Option<&str>) -> String {
    match param {
        None | Some("") => DEFAULT_PARAM.to_owned(),
        Some(p) if p.starts_with('/') => p.to_owned(),
        Some(p) => format!("/{p}"),
    }
}

/// Outcome of binding every discovered controller.
#[derive(Debug, Default)]
pub struct Bound {
    pub routes: usize,
    pub controllers: usize,
    pub skipped: Vec<(PathBuf, String)>,
}

/// Loads, instantiates and registers controllers.
pub struct Binder<'a, L: ?Sized> {
    loader: &'a L,
    post_args: bool,
    fail_fast: bool,
}

impl<'a, L: ModuleLoader + ?Sized> Binder<'a, L> {
    pub fn new(loader: &'a L) -> Self {
        Self { loader, post_args: false, fail_fast: false }
    }

    /// Put the id parameter on `post` routes too.
    pub fn post_args(mut self, yes: bool) -> Self {
        self.post_args = yes;
        self
    }

    /// Abort on the first controller that fails instead of skipping it.
    pub fn fail_fast(mut self, yes: bool) -> Self {
        self.fail_fast = yes;
        self
    }

    /// Binds every file, recording controller-declared middleware into `tables.files`.
    pub fn bind_all<H: Host + ?Sized>(
        &self,
        host: &mut H,
        files: &[RouteFile],
        tables: &mut MidTables,
    ) -> Result<Bound> {
        let mut bound = Bound::default();
        for file in files {
            let mut live = 0;
            match self.bind_counted(host, file, tables, &mut live) {
                Ok(()) => bound.controllers += 1,
                Err(e) if !self.fail_fast => {
                    if live > 0 {
                        warn!(path = %file.file_path.display(), routes = live, "controller partially bound");
                    }
                    error!(path = %file.file_path.display(), error = %e, "controller skipped");
                    bound.skipped.push((file.file_path.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
            bound.routes += live;
        }
        info!(routes = bound.routes, controllers = bound.controllers, skipped = bound.skipped.len(), "controllers bound");
        Ok(bound)
    }

    /// Binds a single file. Returns the number of routes registered.
    ///
    /// Every route is checked against the plan and the host before the first
    /// one is registered. If the host still refuses a route midway, the routes
    /// already registered stay live and keep the file's middleware.
    pub fn bind<H: Host + ?Sized>(
        &self,
        host: &mut H,
        file: &RouteFile,
        tables: &mut MidTables,
    ) -> Result<usize> {
        let mut live = 0;
        self.bind_counted(host, file, tables, &mut live).map(|()| live)
    }

    fn bind_counted<H: Host + ?Sized>(
        &self,
        host: &mut H,
        file: &RouteFile,
        tables: &mut MidTables,
        live: &mut usize,
    ) -> Result<()> {
        let controller = self.instantiate(file)?;
        let plans = plan_routes(file, controller.as_ref(), self.post_args, host.methods());

        check_plans(&plans)?;
        for plan in &plans {
            host.check_route(plan.method, &plan.path, &plan.options())?;
        }

        // Recorded before any route goes live.
        let has_mid = match controller.mid().filter(|m| !m.is_empty()) {
            Some(mid) => {
                tables.files.insert(
                    file.file_group.clone(),
                    FileMid { group: file.dir_group.clone(), mid },
                );
                true
            }
            None => false,
        };

        for RoutePlan { method, path, name, group, action } in plans {
            debug!(%method, path = %path, name = %name, group = %group, "route");
            let ctl = Arc::clone(&controller);
            let handler = move |req: Request| ctl.call(&action, req);
            if let Err(e) = host.route(method, &path, handler.into_boxed_handler(), RouteOptions { name, group }) {
                if *live == 0 && has_mid {
                    tables.files.remove(&file.file_group);
                }
                return Err(e);
            }
            *live += 1;
        }
        Ok(())
    }

    fn instantiate(&self, file: &RouteFile) -> Result<Arc<dyn Controller>> {
        match self.loader.load(&file.file_path)? {
            Module::Controller(factory) => factory().map_err(|source| Error::Instantiate {
                path: file.file_path.clone(),
                source,
            }),
            other => Err(Error::ModuleKind {
                path: file.file_path.clone(),
                expected: "a controller",
                found: other.kind(),
            }),
        }
    }
}
