// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The filesystem collaborator behind `include`/`templFile`.
//!
//! The only interface the engine requires of its host is
//! `read_file(path) -> Option<bytes>` (`SPEC_FULL.md` §6); no `require()`
//! style module resolution, path aliasing, or extension probing is in
//! scope. [`Resolver`] is the trait that collaborator implements;
//! [`FileSystemResolver`] reads real files, [`MemoryResolver`] serves an
//! in-memory map and is what the crate's own tests use.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Reads template source by path. Implementations should not fail loudly:
/// a missing file is `None`, which the engine turns into a `FileOpenError`
/// diagnostic and an empty template rather than a panic or `Result::Err`.
pub trait Resolver: Send + Sync + std::fmt::Debug {
    /// Reads the file at `path`, returning its contents, or `None` if it
    /// cannot be read.
    fn read_file(&self, path: &str) -> Option<String>;

    /// Clones this resolver into a fresh boxed trait object, so an
    /// [`crate::engine::Engine`] can be cheaply cloned without requiring
    /// `Resolver: Clone`.
    fn clone_box(&self) -> Box<dyn Resolver>;
}

impl Clone for Box<dyn Resolver> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Reads templates from a directory on disk, rooted at `root_dir`.
///
/// Paths are resolved relative to the root; anything that would resolve
/// outside it (e.g. via `..`) is rejected.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root_dir: PathBuf,
}

impl FileSystemResolver {
    /// Creates a resolver rooted at `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn resolve_path(&self, path: &str) -> Option<PathBuf> {
        let candidate = self.root_dir.join(Path::new(path));
        let root = self.root_dir.canonicalize().ok()?;
        let resolved = candidate.canonicalize().ok()?;
        if resolved.starts_with(&root) {
            Some(resolved)
        } else {
            None
        }
    }
}

impl Resolver for FileSystemResolver {
    fn read_file(&self, path: &str) -> Option<String> {
        let resolved = self.resolve_path(path)?;
        std::fs::read_to_string(resolved).ok()
    }

    fn clone_box(&self) -> Box<dyn Resolver> {
        Box::new(self.clone())
    }
}

/// An in-memory resolver backed by a `path -> source` map, for tests and
/// embedders that keep templates out of the filesystem entirely.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    templates: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryResolver {
    /// Creates an empty memory resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or overwrites) a template's source under `path`.
    pub fn add_template(&self, path: impl Into<String>, source: impl Into<String>) {
        self.templates
            .lock()
            .expect("memory resolver mutex poisoned")
            .insert(path.into(), source.into());
    }
}

impl Resolver for MemoryResolver {
    fn read_file(&self, path: &str) -> Option<String> {
        self.templates
            .lock()
            .expect("memory resolver mutex poisoned")
            .get(path)
            .cloned()
    }

    fn clone_box(&self) -> Box<dyn Resolver> {
        Box::new(self.clone())
    }
}
