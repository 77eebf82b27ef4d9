// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! sigil's engine façade: the one long-lived object an embedder holds.
//!
//! This module provides the [`Engine`] type, which owns a helper registry
//! and a filename-keyed [`TemplateCache`], and threads itself through the
//! evaluator as the recursive template-inclusion collaborator behind the
//! `include` built-in.
//!
//! # Quick Start
//!
//! ```rust
//! use sigil::{Engine, MemoryResolver, Value};
//!
//! let resolver = MemoryResolver::new();
//! let engine = Engine::with_memory_cache(resolver, 100);
//!
//! let template = engine.templ("<p>Hello, @name</p>");
//! let mut ctx = Value::Null;
//! ctx.set_member("name", Value::string("World"));
//! assert_eq!(template.render(ctx, &engine), "<p>Hello, World</p>");
//! ```
//!
//! # Architecture
//!
//! - **Resolver**: locates template files by path (filesystem or memory).
//! - **Cache**: stores compiled [`Template`]s for reuse, keyed by filename.
//! - **Helper registry**: name -> callable, consulted by `Helper` AST nodes.
//!
//! # Thread Safety
//!
//! Per `SPEC_FULL.md` §5, an `Engine` is not thread-safe: concurrent use of
//! `register_helper`/`templ`/`templ_file` across threads is the embedder's
//! responsibility to serialise. A `Template` compiled by one `Engine` must
//! not be rendered against a different `Engine`, since helper resolution
//! and `include` both consult the owning engine.

use std::sync::{Arc, RwLock};

use crate::builtins;
use crate::cache::TemplateCache;
use crate::error::{diagnose, Diagnostic};
use crate::resolver::Resolver;
use crate::template::Template;
use crate::value::Value;

/// A helper callable: `(context, args) -> result`, where `args` is always
/// an `Array` value, even for a zero-argument call.
pub type HelperFn = Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>;

/// Owns a helper registry and a filename-keyed template cache.
///
/// Cloning an `Engine` is cheap: the registry and cache are shared via
/// `Arc`, so clones observe each other's `register_helper`/`templ_file`
/// mutations (the same sharing the original engine's `Arc<Mutex<...>>`
/// caching gave native builds, without a WASM-specific `Rc<RefCell<...>>`
/// branch since this engine does not target WASM).
#[derive(Clone)]
pub struct Engine {
    resolver: Box<dyn Resolver>,
    cache: Arc<TemplateCache>,
    helpers: Arc<RwLock<std::collections::HashMap<String, HelperFn>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field(
                "helpers",
                &self.helpers.read().unwrap().keys().collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine over `resolver` with the default cache capacity.
    pub fn new(resolver: impl Resolver + 'static) -> Self {
        Self::with_memory_cache(resolver, 128)
    }

    /// Creates an engine over `resolver` with a template cache bounded to
    /// `cache_capacity` entries — the one configuration knob `SPEC_FULL.md`
    /// §3 calls for, in the teacher's builder-style constructor name.
    pub fn with_memory_cache(resolver: impl Resolver + 'static, cache_capacity: usize) -> Self {
        Self {
            resolver: Box::new(resolver),
            cache: Arc::new(TemplateCache::new(cache_capacity)),
            helpers: Arc::new(RwLock::new(std::collections::HashMap::new())),
        }
    }

    /// Constructs a [`Template`] from literal source text. Not cached (use
    /// [`Engine::templ_file`] for the filename-keyed cache).
    pub fn templ(&self, text: impl Into<String>) -> Template {
        Template::new(text)
    }

    /// Consults the in-process cache keyed by `path`; on a miss, reads the
    /// file via the resolver, constructs a [`Template`], inserts it, and
    /// returns it. On a read failure, emits a `FileOpenError` diagnostic and
    /// returns (without caching) a `Template` over empty source, which
    /// renders to an empty string.
    pub fn templ_file(&self, path: &str) -> Arc<Template> {
        if let Some(cached) = self.cache.get(path) {
            return cached;
        }

        let template = match self.resolver.read_file(path) {
            Some(source) => Arc::new(Template::new(source)),
            None => {
                diagnose(Diagnostic::FileOpenError(path));
                return Arc::new(Template::new(String::new()));
            }
        };

        self.cache.insert(path.to_string(), template.clone());
        template
    }

    /// Installs (or overwrites) the helper registered under `name`.
    pub fn register_helper<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.helpers
            .write()
            .expect("helper registry poisoned")
            .insert(name.into(), Arc::new(f));
    }

    /// `true` if a user helper is registered under `name` (the built-in
    /// `include`/`rawHtml` names always report `true`, since they are
    /// always available).
    pub fn has_helper(&self, name: &str) -> bool {
        matches!(name, "include" | "rawHtml")
            || self
                .helpers
                .read()
                .expect("helper registry poisoned")
                .contains_key(name)
    }

    /// Looks up and invokes the helper registered under `name`. `args` must
    /// already be an `Array` value, per the helper signature's contract
    /// that arguments always arrive as one, even for a zero-argument call.
    /// A missing helper emits an `UnknownHelper` diagnostic and returns an
    /// empty string value.
    ///
    /// `include` and `rawHtml` are handled here directly rather than via
    /// the user registry, since `include` needs access to the engine
    /// itself to compile/cache the included file.
    pub fn call_helper(&self, name: &str, ctx: &Value, args: &Value) -> Value {
        match name {
            "include" => builtins::include(self, ctx, args),
            "rawHtml" => builtins::raw_html(ctx, args),
            _ => {
                let helper = self
                    .helpers
                    .read()
                    .expect("helper registry poisoned")
                    .get(name)
                    .cloned();
                match helper {
                    Some(f) => f(ctx, args),
                    None => {
                        diagnose(Diagnostic::UnknownHelper(name));
                        Value::string(String::new())
                    }
                }
            }
        }
    }
}
