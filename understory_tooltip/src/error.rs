// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolver failures and the diagnostic sink they are reported to.
//!
//! Nothing in this crate is fatal. A failing resolver is reported through a
//! [`DiagnosticSink`] and then treated as "no tooltip".

use alloc::string::String;

/// Why a hover resolver produced no answer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The resolver reported a failure.
    #[error("hover resolver failed: {0}")]
    Failed(String),
    /// The resolver's future was dropped before it answered.
    #[error("hover resolver was canceled")]
    Canceled,
}

impl ResolveError {
    /// Build a [`ResolveError::Failed`] from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Host hook for failures that must not reach the event loop.
pub trait DiagnosticSink {
    /// Report `error`, raised while doing `context`.
    fn report(&self, context: &str, error: &ResolveError);
}

/// Reports through the [`log`] facade at error level.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, context: &str, error: &ResolveError) {
        log::error!("{context}: {error}");
    }
}

impl<F: Fn(&str, &ResolveError)> DiagnosticSink for F {
    fn report(&self, context: &str, error: &ResolveError) {
        self(context, error);
    }
}
