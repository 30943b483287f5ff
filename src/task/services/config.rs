//! Tuning knobs for the task service.

/// Configuration for [`TaskBoardService`](super::TaskBoardService).
///
/// # Examples
///
/// ```
/// use modulor::task::services::TaskServiceConfig;
///
/// let config = TaskServiceConfig::default();
/// assert_eq!(config.max_commit_attempts, 5);
///
/// let strict = TaskServiceConfig::strict();
/// assert_eq!(strict.max_commit_attempts, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskServiceConfig {
    /// How many times a placement change is planned and submitted before a
    /// persistent conflict is reported to the caller. Values below 1 are
    /// treated as 1.
    pub max_commit_attempts: u32,
}

impl Default for TaskServiceConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: 5,
        }
    }
}

impl TaskServiceConfig {
    /// Creates a configuration that never retries, surfacing every conflict
    /// to the caller.
    ///
    /// Useful when an outer layer owns the retry policy.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_commit_attempts: 1,
        }
    }

    /// Sets the number of commit attempts.
    #[must_use]
    pub const fn with_max_commit_attempts(mut self, attempts: u32) -> Self {
        self.max_commit_attempts = attempts;
        self
    }

    pub(super) fn effective_attempts(self) -> u32 {
        self.max_commit_attempts.max(1)
    }
}
