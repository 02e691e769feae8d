//! Loader configuration.
//!
//! [`Options`] is what the application writes (by hand or in TOML);
//! [`Config`] is the resolved form with absolute paths whose directories
//! are known to exist.
//!
//! ```toml
//! app_path = "/srv/app"
//! controller_path = "controller"   # relative to app_path
//! midware_path = "/etc/app/mid"    # absolute, used as is
//! subgroup = ["api"]
//! post_args = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Loader options. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub app_path: PathBuf,
    pub controller_path: PathBuf,
    pub model_path: PathBuf,
    pub midware_path: PathBuf,
    /// Run the model stage.
    pub load_model: bool,
    /// Service namespace models are published under.
    pub mname: String,
    /// Only these top-level controller directories are walked. `None` walks all.
    pub subgroup: Option<Vec<String>>,
    /// Put the id parameter on `post` routes.
    pub post_args: bool,
    /// Extension of module files, without the dot.
    pub extension: String,
    /// Abort on the first controller that fails to load.
    pub fail_fast: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            app_path: PathBuf::from("."),
            controller_path: PathBuf::from("controller"),
            model_path: PathBuf::from("model"),
            midware_path: PathBuf::from("middleware"),
            load_model: true,
            mname: "model".to_owned(),
            subgroup: None,
            post_args: false,
            extension: "rs".to_owned(),
            fail_fast: false,
        }
    }
}

impl Options {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn app_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_path = path.into();
        self
    }

    pub fn subgroup<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subgroup = Some(groups.into_iter().map(Into::into).collect());
        self
    }
}

/// Resolved configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub app_path: PathBuf,
    pub controller_path: PathBuf,
    pub model_path: PathBuf,
    pub midware_path: PathBuf,
    pub load_model: bool,
    pub mname: String,
    pub subgroup: Option<Vec<String>>,
    pub post_args: bool,
    pub extension: String,
    pub fail_fast: bool,
}

impl Config {
    /// Canonicalises `app_path`, anchors relative directories to it and
    /// creates any directory that is missing.
    pub fn resolve(options: Options) -> Result<Self> {
        let app_path = fs::canonicalize(&options.app_path)
            .map_err(|e| Error::io(&options.app_path, e))?;
        let anchor = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { app_path.join(p) };

        let config = Self {
            controller_path: anchor(&options.controller_path),
            model_path: anchor(&options.model_path),
            midware_path: anchor(&options.midware_path),
            load_model: options.load_model,
            mname: options.mname,
            subgroup: options.subgroup,
            post_args: options.post_args,
            extension: options.extension.trim_start_matches('.').to_owned(),
            fail_fast: options.fail_fast,
            app_path,
        };

        for dir in [&config.controller_path, &config.midware_path, &config.model_path] {
            ensure_dir(dir)?;
        }
        Ok(config)
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| Error::Bootstrap { path: path.to_path_buf(), source })?;
    debug!(dir = %path.display(), "created");
    Ok(())
}
