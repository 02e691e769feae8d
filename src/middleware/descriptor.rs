//! Middleware descriptors and the three tier tables.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A single string or a list of strings. Descriptor scopes accept both.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s.clone()],
            Self::Many(v) => v.clone(),
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(s: &str) -> Self {
        Self::One(s.to_owned())
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(v: Vec<&str>) -> Self {
        Self::Many(v.into_iter().map(str::to_owned).collect())
    }
}

/// Declares one middleware.
///
/// A `name` starting with `@` names a class-style module: it is instantiated
/// with `args` and the instance becomes the middleware. Any other name is a
/// ready-to-use middleware module.
///
/// ```json
/// [
///   { "name": "@auth", "args": { "role": "admin" }, "pre": true },
///   { "name": "cors", "method": ["GET", "OPTIONS"], "group": ["/api", "/admin"] }
/// ]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<OneOrMany>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<OneOrMany>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<OneOrMany>,
    pub pre: bool,
}

impl MiddlewareDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn method(mut self, method: impl Into<OneOrMany>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn group(mut self, group: impl Into<OneOrMany>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn path(mut self, path: impl Into<OneOrMany>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn pre(mut self) -> Self {
        self.pre = true;
        self
    }

    /// Class-style modules carry the `@` sentinel.
    pub fn is_class(&self) -> bool {
        self.name.starts_with('@')
    }

    /// The module name with the class sentinel stripped.
    pub fn module_name(&self) -> &str {
        self.name.strip_prefix('@').unwrap_or(&self.name)
    }
}

/// The raw export of a `__mid` file, parsed only when the resolver consumes it.
#[derive(Clone, Debug, PartialEq)]
pub struct MidSource {
    pub origin: PathBuf,
    pub exports: Value,
}

impl MidSource {
    pub fn descriptors(&self) -> Result<Vec<MiddlewareDescriptor>> {
        serde_json::from_value(self.exports.clone()).map_err(|source| Error::Descriptor {
            origin: self.origin.display().to_string(),
            source,
        })
    }
}

/// File-tier entry: the descriptors a controller declared, plus its group.
#[derive(Clone, Debug, PartialEq)]
pub struct FileMid {
    pub group: String,
    pub mid: Vec<MiddlewareDescriptor>,
}

/// The three middleware tiers, filled by the scanner (global, group) and the
/// controller binder (file), then consumed once by the [`Resolver`](super::Resolver).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MidTables {
    pub global: Option<MidSource>,
    /// Keyed by directory group (`/api`).
    pub groups: BTreeMap<String, MidSource>,
    /// Keyed by file group (`/api/content`).
    pub files: BTreeMap<String, FileMid>,
}

impl MidTables {
    pub fn is_empty(&self) -> bool {
        self.global.is_none() && self.groups.is_empty() && self.files.is_empty()
    }
}
