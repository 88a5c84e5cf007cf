//! Structured logging / reporting (`§4.J`, this expansion's ambient layer).
//!
//! Two channels, filterable independently per `§7`: internal diagnostic
//! detail (retries, timing, chosen code paths) goes through `tracing`
//! spans; the ranked, line-oriented, user-facing log goes through the
//! [`Reporter`] trait so `gofer-core` never hard-codes a presentation.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Decouples the core from how progress and results are displayed.
///
/// Every call passes the artifact's display name first so implementations
/// can align output by field width, as `§7` specifies: `<artifact>: <event>
/// <detail>`.
pub trait Reporter: Send + Sync {
    /// Report a completed or attempted event for `artifact`.
    fn event(&self, artifact: &str, event: &str, detail: &str);

    /// Report a debug-level detail: used for the one error the core
    /// recovers from in-band, a `NotFound` on a Metadata artifact (`§7`).
    fn debug(&self, artifact: &str, detail: &str) {
        tracing::debug!(artifact, detail, "recoverable event");
    }
}

/// A [`Reporter`] that emits the `§7` ranked log format to stdout, with
/// field-width alignment by the longest artifact display name seen so far.
///
/// Width is tracked with an [`AtomicUsize`] rather than requiring every
/// display name up front, since `§4.F3` discovers Metadata artifacts only
/// after their parent Descriptor has been verified.
pub struct LineReporter {
    width: AtomicUsize,
}

impl LineReporter {
    /// Construct a reporter with no prior width; the first few lines may be
    /// unaligned until the widest name so far has been observed.
    pub fn new() -> Self {
        Self {
            width: AtomicUsize::new(0),
        }
    }

    /// Construct a reporter pre-seeded with the widest name among
    /// `artifacts`, so every line aligns from the first one printed.
    pub fn with_known_width<'a>(artifacts: impl IntoIterator<Item = &'a str>) -> Self {
        let width = artifacts.into_iter().map(str::len).max().unwrap_or(0);
        Self {
            width: AtomicUsize::new(width),
        }
    }

    fn observe(&self, artifact: &str) -> usize {
        let len = artifact.len();
        let mut current = self.width.load(Ordering::Relaxed);
        while len > current {
            match self
                .width
                .compare_exchange(current, len, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return len,
                Err(observed) => current = observed,
            }
        }
        current
    }
}

impl Default for LineReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for LineReporter {
    fn event(&self, artifact: &str, event: &str, detail: &str) {
        let width = self.observe(artifact);
        if detail.is_empty() {
            println!("{artifact:width$}: {event}");
        } else {
            println!("{artifact:width$}: {event} {detail}");
        }
    }

    fn debug(&self, artifact: &str, detail: &str) {
        tracing::debug!(artifact, detail, "recoverable event");
    }
}

/// A [`Reporter`] that discards every event, for library use and tests that
/// only care about the returned report structs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn event(&self, _artifact: &str, _event: &str, _detail: &str) {}

    fn debug(&self, artifact: &str, detail: &str) {
        tracing::debug!(artifact, detail, "recoverable event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_grows_with_longest_name_seen() {
        let reporter = LineReporter::new();
        assert_eq!(reporter.observe("a"), 1);
        assert_eq!(reporter.observe("abc"), 3);
        assert_eq!(reporter.observe("ab"), 3);
    }

    #[test]
    fn with_known_width_seeds_from_artifacts() {
        let reporter = LineReporter::with_known_width(["short", "a-much-longer-name"]);
        assert_eq!(reporter.observe("x"), "a-much-longer-name".len());
    }

    #[test]
    fn null_reporter_does_not_panic() {
        let reporter = NullReporter;
        reporter.event("a@v1", "verified", "");
        reporter.debug("b@v1", "not found");
    }
}
