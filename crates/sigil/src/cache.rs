// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The `Engine`'s in-process, filename-keyed template cache.
//!
//! `SPEC_FULL.md` §3 asks for this to be bounded (an `lru::LruCache`) rather
//! than the unbounded `HashMap` a literal reading of `templFile`'s "cache
//! keyed by path" would suggest, so a long-lived `Engine` serving many
//! distinct template files cannot grow without limit. Per §5, an `Engine`
//! (and therefore this cache) is not thread-safe on its own; concurrent use
//! across threads is the embedder's responsibility to serialise.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::template::Template;

/// An LRU cache of compiled templates, keyed by filename.
#[derive(Debug)]
pub struct TemplateCache {
    entries: Mutex<LruCache<String, Arc<Template>>>,
}

impl TemplateCache {
    /// Creates a cache holding at most `capacity` templates.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the cached template for `key`, if present.
    pub fn get(&self, key: &str) -> Option<Arc<Template>> {
        self.entries
            .lock()
            .expect("template cache mutex poisoned")
            .get(key)
            .cloned()
    }

    /// Inserts `template` under `key`, evicting the least-recently-used
    /// entry if the cache is at capacity.
    pub fn insert(&self, key: String, template: Arc<Template>) {
        self.entries
            .lock()
            .expect("template cache mutex poisoned")
            .put(key, template);
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(128)
    }
}
