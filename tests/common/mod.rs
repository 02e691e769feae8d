//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tsu_loader::{Action, BoxFuture, Controller, Method, Mode, Request, Response, Verb, Verbs};

/// Temporary application root, canonicalised so registry keys match scanned paths.
pub struct App {
    _dir: TempDir,
    pub root: PathBuf,
}

impl App {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().canonicalize().expect("canonicalize");
        Self { _dir: dir, root }
    }

    /// Creates an empty file (and its parents) relative to the app root.
    pub fn touch(&self, rel: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, b"").expect("write");
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(&path).expect("mkdir");
        path
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// A controller whose shape is set field by field.
#[derive(Clone, Default)]
pub struct Shape {
    pub mode: Mode,
    pub method: Option<Method>,
    pub verbs: Verbs,
    pub mid: Option<Vec<tsu_loader::MiddlewareDescriptor>>,
    /// Route name overrides.
    pub names: Vec<(Verb, &'static str)>,
}

impl Shape {
    pub fn restful(verbs: Verbs) -> Self {
        Self { verbs, ..Self::default() }
    }

    pub fn callback(method: Method) -> Self {
        Self { mode: Mode::Callback, method: Some(method), ..Self::default() }
    }
}

impl Controller for Shape {
    fn mode(&self) -> Mode { self.mode }
    fn method(&self) -> Method { self.method.unwrap_or(Method::Get) }
    fn verbs(&self) -> Verbs { self.verbs }
    fn mid(&self) -> Option<Vec<tsu_loader::MiddlewareDescriptor>> { self.mid.clone() }

    fn route_name(&self, action: &Action) -> Option<String> {
        self.names
            .iter()
            .find(|(verb, _)| *action == Action::Verb(*verb))
            .map(|(_, name)| (*name).to_owned())
    }

    fn call(&self, action: &Action, req: Request) -> BoxFuture {
        let body = format!("{}:{}", action.as_str(), req.param("id").unwrap_or("-"));
        Box::pin(async move { Response::text(body) })
    }
}

/// Records the order middleware ran in.
#[derive(Clone, Default)]
pub struct Trail(pub Arc<Mutex<Vec<String>>>);

impl Trail {
    pub fn push(&self, s: &str) {
        self.0.lock().expect("trail").push(s.to_owned());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().expect("trail"))
    }
}
