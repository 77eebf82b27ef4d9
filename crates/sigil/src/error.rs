// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the sigil template engine.
//!
//! Most template-authoring mistakes are *soft* errors by design (see the
//! crate-level docs): a bad directive degrades to a sentinel string, an
//! unknown variable degrades to `Null`, a missing helper degrades to an
//! empty string. None of those paths produce an [`Error`]. This type only
//! covers the embedder-facing failures that the rendering pipeline itself
//! cannot paper over: a `toValue::<T>()` tag mismatch, or an I/O failure
//! surfaced through a [`crate::resolver::Resolver`] implementation.

use thiserror::Error;

/// The literal string a template renders to when it fails to parse.
pub const SYNTAX_ERROR_SENTINEL: &str = "template syntax error";

/// Errors that can escape the engine's otherwise total rendering pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// `Value::to_value::<T>()` was called against a `UserType` payload
    /// carrying a different type tag.
    #[error("wrong type: expected {expected}, found {found}")]
    WrongType {
        /// The type name the caller asked for.
        expected: &'static str,
        /// The type name actually stored.
        found: &'static str,
    },

    /// A [`crate::resolver::Resolver`] failed to read a template file.
    #[error("failed to read template {path:?}: {source}")]
    FileOpen {
        /// The path that could not be opened.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The in-process template cache could not be locked.
    #[error("template cache poisoned")]
    CachePoisoned,
}

/// A `Result` alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal diagnostic surfaced during a render.
///
/// sigil never aborts an embedder over a malformed template: unknown
/// variables, missing helpers, and unreadable include files all degrade to
/// an empty/`Null` result per the error table and are reported here instead
/// of via [`Error`]. The channel has no stable format; embedders that care
/// observe it through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic<'a> {
    /// `findVariable` exhausted the scope chain and pseudo-members.
    UnknownVariable(&'a str),
    /// `callHelper` found no helper registered under this name.
    UnknownHelper(&'a str),
    /// `templFile` could not read the backing file.
    FileOpenError(&'a str),
    /// The parser rejected the source; the template degraded to the
    /// syntax-error sentinel.
    SyntaxError,
}

impl std::fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnknownVariable(name) => write!(f, "unknown variable `{name}`"),
            Diagnostic::UnknownHelper(name) => write!(f, "unknown helper `{name}`"),
            Diagnostic::FileOpenError(path) => write!(f, "could not open template `{path}`"),
            Diagnostic::SyntaxError => write!(f, "template failed to parse"),
        }
    }
}

/// Emits a [`Diagnostic`] on the `tracing` `warn` channel.
///
/// This is the one and only place diagnostics are surfaced; every soft-error
/// path in [`crate::evaluator`] and [`crate::engine`] routes through it
/// instead of calling `tracing::warn!` directly, so the wording stays
/// consistent.
pub fn diagnose(d: Diagnostic<'_>) {
    tracing::warn!(target: "sigil", "{d}");
}
