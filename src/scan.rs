//! Directory scanner.
//!
//! Walks the controller root one level deep:
//!
//! ```text
//! controller/
//! ├── __mid.rs        → global middleware
//! ├── home.rs         → /home         (group "/")
//! ├── !draft.rs       → skipped
//! ├── api/
//! │   ├── __mid.rs    → group middleware for "/api"
//! │   ├── content.rs  → /api/content  (group "/api")
//! │   └── v2/         → not descended into
//! └── !legacy/        → skipped
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::middleware::{MidSource, MidTables};
use crate::module::{Module, ModuleLoader};

/// Names starting with this are ignored, files and directories alike.
pub const EXCLUDE_SENTINEL: char = '!';

/// Stem of the per-directory middleware descriptor file.
pub const MID_FILE: &str = "__mid";

/// Directories deeper than this below the root are not walked.
const MAX_DEPTH: usize = 1;

/// A controller file and the route prefix it maps to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteFile {
    pub file_path: PathBuf,
    /// `dir_group + "/" + module_name`, e.g. `/api/content`.
    pub file_group: String,
    /// `/api` for files in `api/`, `/` for files in the root.
    pub dir_group: String,
    pub file_name: String,
    pub module_name: String,
}

/// Everything the scan phase produces. The binder adds the file tier.
#[derive(Clone, Debug, Default)]
pub struct LoadResult {
    pub routes: Vec<RouteFile>,
    pub tables: MidTables,
}

/// Returns the module name for an eligible file: `content.rs` → `content`.
///
/// Bare extensions (`.rs`) and other extensions are not eligible.
pub fn module_stem<'n>(file_name: &'n str, extension: &str) -> Option<&'n str> {
    file_name
        .strip_suffix(extension)?
        .strip_suffix('.')
        .filter(|stem| !stem.is_empty())
}

/// Walks a controller directory.
pub struct Scanner<'a, L: ?Sized> {
    loader: &'a L,
    extension: &'a str,
    subgroup: Option<&'a [String]>,
}

impl<'a, L: ModuleLoader + ?Sized> Scanner<'a, L> {
    pub fn new(loader: &'a L, extension: &'a str) -> Self {
        Self { loader, extension, subgroup: None }
    }

    /// Only descend into directories named here.
    pub fn subgroup(mut self, allow: Option<&'a [String]>) -> Self {
        self.subgroup = allow;
        self
    }

    /// Any unreadable directory or unloadable `__mid` file fails the whole scan.
    pub fn scan(&self, root: &Path) -> Result<LoadResult> {
        let mut out = LoadResult::default();
        self.walk(root, 0, "", &mut out)?;
        info!(
            root = %root.display(),
            routes = out.routes.len(),
            groups = out.tables.groups.len(),
            global_mid = out.tables.global.is_some(),
            "controller tree scanned"
        );
        Ok(out)
    }

    fn walk(&self, dir: &Path, depth: usize, dir_group: &str, out: &mut LoadResult) -> Result<()> {
        let mut entries = fs::read_dir(dir)
            .map_err(|e| Error::io(dir, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| Error::io(dir, e))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %path.display(), "non UTF-8 file name skipped");
                continue;
            };
            if name.starts_with(EXCLUDE_SENTINEL) {
                continue;
            }

            let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
            if file_type.is_dir() {
                if depth >= MAX_DEPTH {
                    continue;
                }
                if let Some(allow) = self.subgroup {
                    if !allow.iter().any(|g| *g == name) {
                        debug!(dir = %name, "not in subgroup list");
                        continue;
                    }
                }
                self.walk(&path, depth + 1, &format!("{dir_group}/{name}"), out)?;
            } else if file_type.is_file() {
                let Some(stem) = module_stem(&name, self.extension) else {
                    continue;
                };

                if stem == MID_FILE {
                    let source = self.mid_source(&path)?;
                    if depth == 0 {
                        out.tables.global = Some(source);
                    } else {
                        out.tables.groups.insert(dir_group.to_owned(), source);
                    }
                    continue;
                }

                let file = RouteFile {
                    file_group: format!("{dir_group}/{stem}"),
                    dir_group: if dir_group.is_empty() { "/".to_owned() } else { dir_group.to_owned() },
                    module_name: stem.to_owned(),
                    file_name: name,
                    file_path: path,
                };
                debug!(file = %file.file_group, group = %file.dir_group, "controller found");
                out.routes.push(file);
            }
        }
        Ok(())
    }

    fn mid_source(&self, path: &Path) -> Result<MidSource> {
        match self.loader.load(path)? {
            Module::Exports(exports) => Ok(MidSource { origin: path.to_path_buf(), exports }),
            other => Err(Error::ModuleKind {
                path: path.to_path_buf(),
                expected: "an export list",
                found: other.kind(),
            }),
        }
    }
}
