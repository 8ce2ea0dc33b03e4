//! Diagnostics for contained failures.
//!
//! Every plugin or renderer failure that the pipeline absorbs is logged via
//! `tracing` and recorded in a [`Diagnostics`] sink. The display format of a
//! [`Diagnostic`] is stable and safe to assert on.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, PoisonError};

use crate::plugin::{Plugin, PluginError};
use crate::util::panic_message;

/// Where a contained failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    BlockTransform,
    Override,
    TextTransform,
    BeforeRender,
    AfterRender,
    /// A block renderer failed and was replaced by a fallback.
    Render,
    LazyLoad,
    MaxDepth,
}

impl Stage {
    /// Fixed message prefix for this stage.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BlockTransform => "plugin block transform error",
            Self::Override => "plugin override error",
            Self::TextTransform => "plugin text transform error",
            Self::BeforeRender => "plugin before render error",
            Self::AfterRender => "plugin after render error",
            Self::Render => "block render error",
            Self::LazyLoad => "lazy load error",
            Self::MaxDepth => "max depth exceeded",
        }
    }
}

/// One contained failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    /// Plugin name, lazy renderer name, or `<id> <type>` for render failures.
    pub source: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.stage.label(), self.source, self.message)
    }
}

/// Thread-safe collector of diagnostics for one render pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a contained failure.
    pub fn record(&self, stage: Stage, source: impl Into<String>, message: impl fmt::Display) {
        let diagnostic = Diagnostic {
            stage,
            source: source.into(),
            message: message.to_string(),
        };
        tracing::warn!(stage = stage.label(), source = %diagnostic.source, "{diagnostic}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }

    /// Snapshot of the recorded diagnostics.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke a plugin hook, containing errors and panics.
    ///
    /// Returns `None` (and records one diagnostic) if the hook failed.
    pub(crate) fn run_hook<T>(
        &self,
        stage: Stage,
        plugin: &dyn Plugin,
        hook: impl FnOnce() -> Result<T, PluginError>,
    ) -> Option<T> {
        let outcome = catch_unwind(AssertUnwindSafe(hook))
            .unwrap_or_else(|payload| Err(PluginError::Panicked(panic_message(payload.as_ref()))));
        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                self.record(stage, plugin.name(), err);
                None
            }
        }
    }
}
