//! Run summary accumulation and notification rendering.

use chrono::{DateTime, Utc};

use crate::LoadFailure;

/// The remote operation a result line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Policy creation.
    Create,
    /// Policy update.
    Update,
    /// Policy removal.
    Remove,
}

impl Operation {
    /// Uppercase label used in result lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Remove => "REMOVE",
        }
    }
}

/// Accumulated outcome of one reconciliation run.
///
/// Built incrementally while decisions are applied and frozen once the
/// reporter takes over. The line sequence preserves processing order,
/// failures included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    created: u32,
    updated: u32,
    removed: u32,
    failed: u32,
    lines: Vec<String>,
}

impl RunSummary {
    /// Create an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful creation.
    pub fn record_created(&mut self, name: &str) {
        self.created += 1;
        self.lines.push(format!("CREATED {name}"));
    }

    /// Record a successful update.
    pub fn record_updated(&mut self, name: &str) {
        self.updated += 1;
        self.lines.push(format!("UPDATED {name}"));
    }

    /// Record a successful removal.
    pub fn record_removed(&mut self, name: &str) {
        self.removed += 1;
        self.lines.push(format!("REMOVED {name}"));
    }

    /// Record a failed remote operation with its error detail.
    pub fn record_failed(&mut self, operation: Operation, name: &str, detail: &str) {
        self.failed += 1;
        self.lines
            .push(format!("FAILED TO {} {name}: {detail}", operation.label()));
    }

    /// Merge the loader's per-file failures into the summary.
    pub fn absorb_load_failures(&mut self, failures: &[LoadFailure]) {
        for failure in failures {
            self.failed += 1;
            self.lines
                .push(format!("FAILED TO LOAD {}: {}", failure.file, failure.detail));
        }
    }

    /// Number of policies created.
    #[must_use]
    pub const fn created(&self) -> u32 {
        self.created
    }

    /// Number of policies updated.
    #[must_use]
    pub const fn updated(&self) -> u32 {
        self.updated
    }

    /// Number of policies removed.
    #[must_use]
    pub const fn removed(&self) -> u32 {
        self.removed
    }

    /// Number of failed items, load failures included.
    #[must_use]
    pub const fn failed(&self) -> u32 {
        self.failed
    }

    /// Ordered per-item result lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any item failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Run metadata supplied by the surrounding CI environment.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Workflow name label.
    pub workflow: String,
    /// Run identifier label.
    pub run_id: String,
    /// Wall-clock time the report was rendered.
    pub timestamp: DateTime<Utc>,
}

/// Notification priority, as the sink's `Priority` header expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Normal delivery.
    Default,
    /// Urgent delivery, used when any item failed.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Categorical tag, as the sink's `Tags` header expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Run completed without failures.
    WhiteCheckMark,
    /// At least one item failed.
    Warning,
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WhiteCheckMark => write!(f, "white_check_mark"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A rendered notification, ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// `Title` header value.
    pub title: String,
    /// `Priority` header value.
    pub priority: Priority,
    /// `Tags` header value.
    pub tags: Tag,
    /// Plain-text body.
    pub body: String,
}

/// Render the run summary into a notification.
///
/// A single predicate drives title, priority, and tag: any failed item makes
/// the run report as completed-with-errors at high priority.
#[must_use]
pub fn render(summary: &RunSummary, context: &RunContext) -> Notification {
    let (title, priority, tags) = if summary.has_failures() {
        (
            "Conditional Access Policy Sync Completed with Errors",
            Priority::High,
            Tag::Warning,
        )
    } else {
        (
            "Conditional Access Policy Sync Successful",
            Priority::Default,
            Tag::WhiteCheckMark,
        )
    };

    let mut body = format!(
        "Sync run at {}\nWorkflow: {}\nRun: {}\n\n\
         Created: {}\nUpdated: {}\nRemoved: {}\nFailed: {}\n",
        context.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        context.workflow,
        context.run_id,
        summary.created(),
        summary.updated(),
        summary.removed(),
        summary.failed(),
    );

    if !summary.lines().is_empty() {
        body.push_str("\nResults:\n");
        for line in summary.lines() {
            body.push_str("- ");
            body.push_str(line);
            body.push('\n');
        }
    }

    Notification {
        title: title.to_string(),
        priority,
        tags,
        body,
    }
}
