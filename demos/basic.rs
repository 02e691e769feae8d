//! Minimal loader example: a throwaway app tree bound onto the reference router.
//!
//! Run with:
//!   cargo run --example basic

use std::fs;

use serde_json::json;
use tsu_loader::middleware::{self, Next};
use tsu_loader::{
    Action, BoxFuture, Controller, Loader, Method, MiddlewareDescriptor, Mode, Options, Registry,
    Request, Response, Router, Verb, Verbs,
};

struct Content;

impl Controller for Content {
    fn verbs(&self) -> Verbs {
        Verbs::GET | Verbs::LIST | Verbs::POST
    }

    fn mid(&self) -> Option<Vec<MiddlewareDescriptor>> {
        Some(vec![MiddlewareDescriptor::new("timing").path("post")])
    }

    fn call(&self, action: &Action, req: Request) -> BoxFuture {
        let body = match action {
            Action::Verb(Verb::Get) => format!(r#"{{"id":"{}"}}"#, req.param("id").unwrap_or("?")),
            Action::Verb(Verb::Post) => return Box::pin(async { Response::status(201) }),
            _ => r#"[{"id":"1"},{"id":"2"}]"#.to_owned(),
        };
        Box::pin(async move { Response::json(body) })
    }
}

struct Upload;

impl Controller for Upload {
    fn mode(&self) -> Mode {
        Mode::Callback
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn call(&self, _action: &Action, req: Request) -> BoxFuture {
        let size = req.body().len();
        Box::pin(async move { Response::text(format!("received {size} bytes")) })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    for file in ["controller/__mid.rs", "controller/api/content.rs", "controller/upload.rs"] {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap_or(&root))?;
        fs::write(path, b"")?;
    }

    let modules = Registry::with_root(&root)
        .exports("controller/__mid.rs", json!([{ "name": "request-id", "pre": true }]))
        .controller("controller/api/content.rs", || Ok(Content))
        .controller("controller/upload.rs", || Ok(Upload))
        .middleware("middleware/request-id", middleware::from_fn(|req: Request, next: Next| async move {
            next.run(req).await.with_header("x-request-id", "demo")
        }))
        .middleware("middleware/timing", middleware::from_fn(|req: Request, next: Next| next.run(req)));

    let mut app = Router::new();
    let report = Loader::new(Options::default().app_path(&root), modules)?.init(&mut app)?;
    println!("{report:#?}");

    for route in app.table() {
        println!("{:<7} {:<20} {}", route.method.as_str(), route.path, route.name);
    }

    if let Some((handler, params)) = app.lookup(Method::Get, "/api/content/42") {
        let res = handler.call(Request::new(Method::Get, "/api/content/42").with_params(params)).await;
        println!("GET /api/content/42 -> {}", String::from_utf8_lossy(res.body()));
    }

    Ok(())
}
