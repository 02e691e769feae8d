//! Middleware resolution and attachment.
//!
//! Tier order is fixed: every global descriptor, then each group's
//! descriptors, then each file's. Within a tier, list order holds. Any
//! failure here is fatal: a chain with a hole in it is worse than no start.

use std::path::Path;

use tracing::{debug, info};

use super::descriptor::{MidTables, MiddlewareDescriptor, OneOrMany};
use super::BoxedMiddleware;
use crate::error::{Error, Result};
use crate::host::{Host, MidOptions, Tier};
use crate::method::Method;
use crate::module::{Module, ModuleLoader};

/// File-tier targets when a descriptor names no `path`.
const FILE_DEFAULT_TARGETS: [&str; 9] = [
    "post", "put", "delete", "get", "list", "options", "patch", "head", "callback",
];

/// Turns descriptors into middleware and hands them to a host.
pub struct Resolver<'a, L: ?Sized> {
    loader: &'a L,
    midware_path: &'a Path,
}

impl<'a, L: ModuleLoader + ?Sized> Resolver<'a, L> {
    pub fn new(loader: &'a L, midware_path: &'a Path) -> Self {
        Self { loader, midware_path }
    }

    /// Attaches all three tiers. Returns the number of registrations made.
    pub fn attach<H: Host + ?Sized>(&self, host: &mut H, tables: &MidTables) -> Result<usize> {
        let mut count = 0;

        if let Some(global) = &tables.global {
            for desc in global.descriptors()? {
                count += self.attach_global(host, &desc)?;
            }
        }

        for (group, source) in &tables.groups {
            for desc in source.descriptors()? {
                count += self.attach_group(host, &desc, group)?;
            }
        }

        for (file_group, file) in &tables.files {
            for desc in &file.mid {
                count += self.attach_file(host, desc, file_group, &file.group)?;
            }
        }

        info!(registrations = count, "middleware attached");
        Ok(count)
    }

    /// Loads the module a descriptor names. Class-style (`@name`) modules are
    /// instantiated with the descriptor's `args`.
    pub fn instance(&self, desc: &MiddlewareDescriptor) -> Result<BoxedMiddleware> {
        let path = self.midware_path.join(desc.module_name());
        let module = self.loader.load(&path)?;
        match (desc.is_class(), module) {
            (true, Module::MiddlewareClass(factory)) => factory(desc.args.as_ref())
                .map_err(|source| Error::Instantiate { path, source }),
            (false, Module::Middleware(middleware)) => Ok(middleware),
            (class, other) => Err(Error::ModuleKind {
                path,
                expected: if class { "a middleware class" } else { "a middleware" },
                found: other.kind(),
            }),
        }
    }

    /// `{ method?, group? }`; a group list registers once per group.
    fn attach_global<H: Host + ?Sized>(&self, host: &mut H, desc: &MiddlewareDescriptor) -> Result<usize> {
        if desc.name.is_empty() {
            return Ok(0);
        }
        let methods = methods(desc)?;
        let groups: Vec<Option<String>> = match &desc.group {
            None => vec![None],
            Some(OneOrMany::One(g)) => vec![Some(g.clone())],
            Some(OneOrMany::Many(gs)) => gs.iter().cloned().map(Some).collect(),
        };

        for group in &groups {
            let mut opts = MidOptions::new(Tier::Global, &desc.name);
            opts.methods = methods.clone();
            opts.group = group.clone();
            opts.pre = desc.pre;
            self.register(host, desc, opts)?;
        }
        Ok(groups.len())
    }

    /// `{ group, method? }`.
    fn attach_group<H: Host + ?Sized>(
        &self,
        host: &mut H,
        desc: &MiddlewareDescriptor,
        group: &str,
    ) -> Result<usize> {
        if desc.name.is_empty() {
            return Ok(0);
        }
        let mut opts = MidOptions::new(Tier::Group, &desc.name);
        opts.methods = methods(desc)?;
        opts.group = Some(group.to_owned());
        opts.pre = desc.pre;
        self.register(host, desc, opts)?;
        Ok(1)
    }

    /// `{ group, names }`: explicit sub-paths, or every name the file could have
    /// produced when `path` is absent or empty.
    fn attach_file<H: Host + ?Sized>(
        &self,
        host: &mut H,
        desc: &MiddlewareDescriptor,
        file_group: &str,
        group: &str,
    ) -> Result<usize> {
        if desc.name.is_empty() {
            return Ok(0);
        }
        let mut opts = MidOptions::new(Tier::File, &desc.name);
        opts.group = Some(group.to_owned());
        opts.pre = desc.pre;
        // An empty `path` list narrows nothing; it must not widen to the group.
        let paths = desc.path.as_ref().map(OneOrMany::to_vec).unwrap_or_default();
        opts.names = if paths.is_empty() {
            std::iter::once(file_group.to_owned())
                .chain(FILE_DEFAULT_TARGETS.iter().map(|t| format!("{file_group}/{t}")))
                .collect()
        } else {
            paths.iter().map(|p| format!("{file_group}/{p}")).collect()
        };
        self.register(host, desc, opts)?;
        Ok(1)
    }

    fn register<H: Host + ?Sized>(
        &self,
        host: &mut H,
        desc: &MiddlewareDescriptor,
        opts: MidOptions,
    ) -> Result<()> {
        let middleware = self.instance(desc)?;
        debug!(tier = %opts.tier, name = %desc.name, group = ?opts.group, pre = opts.pre, "middleware");
        host.use_middleware(middleware, opts)
    }
}

fn methods(desc: &MiddlewareDescriptor) -> Result<Vec<Method>> {
    desc.method
        .as_ref()
        .map(OneOrMany::to_vec)
        .unwrap_or_default()
        .iter()
        .map(|m| Method::parse_loose(m))
        .collect()
}
