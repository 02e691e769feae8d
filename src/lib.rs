//! # tsu-loader
//!
//! Convention over registration. Point the loader at an application directory
//! and it wires up routes, middleware and models on startup.
//!
//! ## The convention
//!
//! ```text
//! app/
//! ├── controller/
//! │   ├── __mid.rs        global middleware list
//! │   ├── home.rs         /home
//! │   └── api/
//! │       ├── __mid.rs    middleware for the /api group
//! │       └── content.rs  /api/content, /api/content/:id
//! ├── middleware/
//! │   └── auth.rs         referenced as "@auth" (class) or "auth" (ready-made)
//! └── model/
//!     └── user.rs         services["model"]["user"]
//! ```
//!
//! - Files are routes. Directories one level down are groups. Deeper ones are ignored.
//! - A leading `!` hides a file or directory.
//! - Middleware attaches in tier order: global, then group, then file.
//!
//! What a file *is* comes from a [`ModuleLoader`]: the loader sees paths, the
//! application decides how a path becomes a controller, middleware or model.
//! [`Registry`] does that from an in-memory table.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tsu_loader::{Action, BoxFuture, Controller, Loader, Options, Registry, Request, Response, Router, Verbs};
//!
//! struct Content;
//!
//! impl Controller for Content {
//!     fn verbs(&self) -> Verbs { Verbs::GET | Verbs::LIST }
//!
//!     fn call(&self, action: &Action, req: Request) -> BoxFuture {
//!         let body = format!("{} {}", action.as_str(), req.path());
//!         Box::pin(async move { Response::text(body) })
//!     }
//! }
//!
//! # fn main() -> Result<(), tsu_loader::Error> {
//! let modules = Registry::with_root("/srv/app")
//!     .controller("controller/api/content.rs", || Ok(Content))
//!     .exports("controller/__mid.rs", json!([{ "name": "@auth", "args": { "role": "admin" } }]));
//!
//! let mut app = Router::new();
//! Loader::new(Options::default().app_path("/srv/app"), modules)?.init(&mut app)?;
//! # Ok(())
//! # }
//! ```

mod config;
mod controller;
mod error;
mod handler;
mod host;
mod loader;
mod method;
mod model;
mod module;
mod request;
mod response;
mod router;
mod scan;

pub mod middleware;

pub use config::{Config, Options};
pub use controller::{check_plans, plan_routes, Action, Binder, Bound, Controller, Mode, RoutePlan, Verb, Verbs};
pub use error::{BoxError, Error, Result};
pub use handler::{BoxFuture, BoxedHandler, Handler};
pub use host::{Host, MidOptions, Resource, RouteOptions, Service, Services, Tier};
pub use loader::{Loader, Report};
pub use method::Method;
pub use middleware::{BoxedMiddleware, Middleware, MiddlewareDescriptor, Next};
pub use model::{Registered, Registrar};
pub use module::{ControllerFactory, MiddlewareFactory, ModelFactory, Module, ModuleLoader, Registry};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::{MiddlewareEntry, RouteEntry, Router};
pub use scan::{module_stem, LoadResult, RouteFile, Scanner, EXCLUDE_SENTINEL, MID_FILE};
