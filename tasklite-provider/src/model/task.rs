//! The remote task entity.

/// Priority stored when the configuration leaves it unset.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Completion flag stored when the configuration leaves it unset.
pub const DEFAULT_COMPLETE: bool = false;

/// A task as the TaskLite API knows it.
///
/// `id == 0` means the task has never been created remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub priority: i32,
    pub complete: bool,
}

impl Task {
    /// A not-yet-created task with default priority and completion.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            priority: DEFAULT_PRIORITY,
            complete: DEFAULT_COMPLETE,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.id != 0
    }
}
