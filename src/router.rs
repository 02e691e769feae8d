//! Reference [`Host`]: a radix-tree router that records what the loader wires up.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. Route
//! names are unique per group. Middleware is kept in registration order so a
//! host built on top can assemble chains from it.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::error::{Error, Result};
use crate::handler::BoxedHandler;
use crate::host::{Host, MidOptions, RouteOptions, Services};
use crate::method::Method;
use crate::middleware::BoxedMiddleware;

// ── Registration records ──────────────────────────────────────────────────────

/// A registered route, as listed by [`Router::table`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteEntry {
    pub method: Method,
    pub path: String,
    pub name: String,
    pub group: String,
}

/// A registered middleware and its scope.
pub struct MiddlewareEntry {
    pub middleware: BoxedMiddleware,
    pub options: MidOptions,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The reference host.
///
/// One radix tree per HTTP method, built once while the loader runs and read
/// afterwards. Alongside the trees it keeps a flat route table, because the
/// loader's invariants are about names and groups, which a radix tree knows
/// nothing about: names must be unique within a group, and a controller's
/// routes are checked against the table before any of them go in.
///
/// Middleware is not executed here. Entries are kept in the order they were
/// registered, which is the order a serving host must chain them in.
pub struct Router {
    methods: Vec<Method>,
    trees: HashMap<Method, MatchitRouter<BoxedHandler>>,
    table: Vec<RouteEntry>,
    middleware: Vec<MiddlewareEntry>,
    services: Services,
}

impl Router {
    /// A router serving [`Method::ROUTABLE`].
    pub fn new() -> Self {
        Self::with_methods(Method::ROUTABLE)
    }

    pub fn with_methods(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            methods: methods.into_iter().collect(),
            trees: HashMap::new(),
            table: Vec::new(),
            middleware: Vec::new(),
            services: Services::new(),
        }
    }

    /// Finds the handler for `method` + `path`, with its captured parameters.
    pub fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.trees.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes in registration order.
    pub fn table(&self) -> &[RouteEntry] {
        &self.table
    }

    pub fn named(&self, group: &str, name: &str) -> Option<&RouteEntry> {
        self.table.iter().find(|r| r.group == group && r.name == name)
    }

    /// Middleware in registration order.
    pub fn middleware(&self) -> &[MiddlewareEntry] {
        &self.middleware
    }

    pub fn published(&self) -> &Services {
        &self.services
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Host for Router {
    fn methods(&self) -> &[Method] {
        &self.methods
    }

    fn check_route(&self, method: Method, path: &str, opts: &RouteOptions) -> Result<()> {
        if !self.methods.contains(&method) {
            return Err(Error::Route {
                path: path.to_owned(),
                reason: format!("{method} is not routed by this host"),
            });
        }
        if self.named(&opts.group, &opts.name).is_some() {
            return Err(Error::DuplicateName { name: opts.name.clone(), group: opts.group.clone() });
        }
        if self.table.iter().any(|r| r.method == method && r.path == path) {
            return Err(Error::Route {
                path: path.to_owned(),
                reason: format!("{method} {path} is already registered"),
            });
        }
        Ok(())
    }

    fn route(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxedHandler,
        opts: RouteOptions,
    ) -> Result<()> {
        self.check_route(method, path, &opts)?;

        // Placeholders that differ only in name (`:id` vs `:key`) pass the
        // table check and are caught by matchit here.
        self.trees
            .entry(method)
            .or_default()
            .insert(matchit_path(path), handler)
            .map_err(|e| Error::Route { path: path.to_owned(), reason: e.to_string() })?;

        self.table.push(RouteEntry {
            method,
            path: path.to_owned(),
            name: opts.name,
            group: opts.group,
        });
        Ok(())
    }

    fn use_middleware(&mut self, middleware: BoxedMiddleware, options: MidOptions) -> Result<()> {
        self.middleware.push(MiddlewareEntry { middleware, options });
        Ok(())
    }

    fn services(&mut self) -> &mut Services {
        &mut self.services
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `/users/:id` → `/users/{id}`.
fn matchit_path(path: &str) -> String {
    path.split('/')
        .map(|seg| match seg.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => seg.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::request::Request;
    use crate::response::Response;

    fn ok() -> BoxedHandler {
        (|_req: Request| async { Response::text("ok") }).into_boxed_handler()
    }

    fn opts(name: &str, group: &str) -> RouteOptions {
        RouteOptions { name: name.into(), group: group.into() }
    }

    #[test]
    fn colon_params_become_matchit_params() {
        assert_eq!(matchit_path("/api/content/:id"), "/api/content/{id}");
        assert_eq!(matchit_path("/a/:x/b/:y"), "/a/{x}/b/{y}");
        assert_eq!(matchit_path("/plain"), "/plain");
    }

    #[test]
    fn lookup_captures_params() {
        let mut router = Router::new();
        router.route(Method::Get, "/api/content/:id", ok(), opts("/api/content/get", "/api")).unwrap();

        let (_, params) = router.lookup(Method::Get, "/api/content/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(router.lookup(Method::Post, "/api/content/42").is_none());
    }

    #[test]
    fn names_are_unique_per_group() {
        let mut router = Router::new();
        router.route(Method::Get, "/a", ok(), opts("n", "/g")).unwrap();
        router.route(Method::Get, "/b", ok(), opts("n", "/other")).unwrap();

        let err = router.route(Method::Get, "/c", ok(), opts("n", "/g")).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
        assert_eq!(router.table().len(), 2);
    }

    #[test]
    fn conflicting_paths_are_rejected() {
        let mut router = Router::new();
        router.route(Method::Get, "/a/:id", ok(), opts("one", "/")).unwrap();
        let err = router.route(Method::Get, "/a/:id", ok(), opts("two", "/")).unwrap_err();
        assert!(matches!(err, Error::Route { .. }));
    }

    #[test]
    fn check_route_validates_without_registering() {
        let mut router = Router::new();
        router.route(Method::Get, "/a", ok(), opts("a", "/")).unwrap();

        assert!(router.check_route(Method::Post, "/a", &opts("b", "/")).is_ok());
        assert!(matches!(
            router.check_route(Method::Get, "/a", &opts("b", "/")),
            Err(Error::Route { .. })
        ));
        assert!(matches!(
            router.check_route(Method::Post, "/b", &opts("a", "/")),
            Err(Error::DuplicateName { .. })
        ));
        assert_eq!(router.table().len(), 1);
    }

    #[test]
    fn unsupported_method_is_rejected() {
        let mut router = Router::with_methods([Method::Get]);
        assert!(router.route(Method::Post, "/a", ok(), opts("a", "/")).is_err());
    }
}
