//! Validated payload carried by a task outside its placement.

use super::{AttachmentId, SubtaskId, TaskDomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Maximum number of characters in a task or subtask title.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum number of characters in a task description.
pub const MAX_DESCRIPTION_CHARS: usize = 5000;

/// Trimmed, non-empty task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the trimmed value is
    /// empty, or [`TaskDomainError::TitleTooLong`] when it exceeds
    /// [`MAX_TITLE_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let actual = trimmed.chars().count();
        if actual > MAX_TITLE_CHARS {
            return Err(TaskDomainError::TitleTooLong { actual });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks a description against [`MAX_DESCRIPTION_CHARS`].
///
/// # Errors
///
/// Returns [`TaskDomainError::DescriptionTooLong`] when the limit is exceeded.
pub fn validate_description(value: impl Into<String>) -> Result<String, TaskDomainError> {
    let description = value.into();
    let actual = description.chars().count();
    if actual > MAX_DESCRIPTION_CHARS {
        return Err(TaskDomainError::DescriptionTooLong { actual });
    }
    Ok(description)
}

/// Trims tags, drops empty ones and removes duplicates, keeping the first
/// occurrence of each.
#[must_use]
pub fn normalize_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter_map(|tag| {
            let trimmed = tag.trim();
            (!trimmed.is_empty() && seen.insert(trimmed.to_owned())).then(|| trimmed.to_owned())
        })
        .collect()
}

/// Checklist item nested in a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    title: String,
    is_completed: bool,
}

impl Subtask {
    /// Creates an open subtask with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySubtaskTitle`] or
    /// [`TaskDomainError::SubtaskTitleTooLong`] for invalid titles.
    pub fn new(title: impl Into<String>) -> Result<Self, TaskDomainError> {
        Self::with_id(SubtaskId::new(), title, false)
    }

    /// Creates a subtask with an existing identifier and completion flag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySubtaskTitle`] or
    /// [`TaskDomainError::SubtaskTitleTooLong`] for invalid titles.
    pub fn with_id(
        id: SubtaskId,
        title: impl Into<String>,
        is_completed: bool,
    ) -> Result<Self, TaskDomainError> {
        let raw = title.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptySubtaskTitle);
        }
        let actual = trimmed.chars().count();
        if actual > MAX_TITLE_CHARS {
            return Err(TaskDomainError::SubtaskTitleTooLong { actual });
        }
        Ok(Self {
            id,
            title: trimmed.to_owned(),
            is_completed,
        })
    }

    /// Returns this subtask marked as completed.
    #[must_use]
    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> SubtaskId {
        self.id
    }

    /// Returns the subtask title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the subtask is done.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }
}

/// File attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    id: AttachmentId,
    url: String,
    file_name: String,
    file_type: String,
    file_size: Option<u64>,
    uploaded_at: DateTime<Utc>,
}

impl Attachment {
    /// Creates an attachment record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyAttachmentField`] when the URL or file
    /// name is blank.
    pub fn new(
        url: impl Into<String>,
        file_name: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Result<Self, TaskDomainError> {
        let url_value = url.into();
        if url_value.trim().is_empty() {
            return Err(TaskDomainError::EmptyAttachmentField("url"));
        }
        let name_value = file_name.into();
        let trimmed_name = name_value.trim();
        if trimmed_name.is_empty() {
            return Err(TaskDomainError::EmptyAttachmentField("file name"));
        }
        Ok(Self {
            id: AttachmentId::new(),
            url: url_value,
            file_name: trimmed_name.to_owned(),
            file_type: String::new(),
            file_size: None,
            uploaded_at,
        })
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = file_type.into();
        self
    }

    /// Sets the size in bytes.
    #[must_use]
    pub const fn with_file_size(mut self, file_size: u64) -> Self {
        self.file_size = Some(file_size);
        self
    }

    /// Returns the attachment identifier.
    #[must_use]
    pub const fn id(&self) -> AttachmentId {
        self.id
    }

    /// Returns the download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the MIME type, empty when unknown.
    #[must_use]
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    /// Returns the size in bytes, if known.
    #[must_use]
    pub const fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    /// Returns the upload timestamp.
    #[must_use]
    pub const fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}
