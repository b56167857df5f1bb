//! Host-facing diagnostics.

use std::fmt;

use crate::error::Error;
use crate::reconciler::Transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One human-readable message attached to the transition that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub transition: Transition,
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        };
        write!(f, "{}: {}\n  {}", level, self.summary, self.detail)
    }
}

/// Ordered sink of diagnostics for one host call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed transition.
    pub fn add_error(&mut self, transition: Transition, err: &Error) {
        self.0.push(Diagnostic {
            severity: Severity::Error,
            transition,
            summary: format!("{} Operation Error", transition.title()),
            detail: format!("Failed to {} the task, got error: {}", transition, err),
        });
    }

    pub fn add_warning(
        &mut self,
        transition: Transition,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.0.push(Diagnostic {
            severity: Severity::Warning,
            transition,
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
