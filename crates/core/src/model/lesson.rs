use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{LessonId, UserId};
use crate::model::text::{optional_text, required_text};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("order index must be >= 0")]
    NegativeOrderIndex,
}

/// Editable lesson fields as typed into the add/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    pub is_published: bool,
}

impl Default for LessonDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            cover_image_url: String::new(),
            is_published: true,
        }
    }
}

/// A named unit of educational content owned by a teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: Option<String>,
    cover_image_url: Option<String>,
    teacher_id: UserId,
    order_index: i32,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Creates a new lesson from a form draft.
    ///
    /// New lessons start at `order_index` 0, same as the backend column default.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank after trimming.
    pub fn new(
        id: LessonId,
        teacher_id: UserId,
        draft: &LessonDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        let title = required_text(&draft.title).ok_or(LessonError::EmptyTitle)?;
        Ok(Self {
            id,
            title,
            description: optional_text(&draft.description),
            cover_image_url: optional_text(&draft.cover_image_url),
            teacher_id,
            order_index: 0,
            is_published: draft.is_published,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a lesson from storage.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if persisted values violate lesson invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: LessonId,
        title: String,
        description: Option<String>,
        cover_image_url: Option<String>,
        teacher_id: UserId,
        order_index: i32,
        is_published: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        if order_index < 0 {
            return Err(LessonError::NegativeOrderIndex);
        }
        Ok(Self {
            id,
            title,
            description,
            cover_image_url,
            teacher_id,
            order_index,
            is_published,
            created_at,
            updated_at,
        })
    }

    /// Applies edited form fields, keeping identity, owner and ordering.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` and leaves the lesson untouched if the
    /// title is blank.
    pub fn apply_draft(&mut self, draft: &LessonDraft, now: DateTime<Utc>) -> Result<(), LessonError> {
        let title = required_text(&draft.title).ok_or(LessonError::EmptyTitle)?;
        self.title = title;
        self.description = optional_text(&draft.description);
        self.cover_image_url = optional_text(&draft.cover_image_url);
        self.is_published = draft.is_published;
        self.updated_at = now;
        Ok(())
    }

    /// Form draft pre-filled with the lesson's current values.
    #[must_use]
    pub fn to_draft(&self) -> LessonDraft {
        LessonDraft {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            cover_image_url: self.cover_image_url.clone().unwrap_or_default(),
            is_published: self.is_published,
        }
    }

    /// Case-insensitive substring match over title and description.
    ///
    /// An empty query matches every lesson. Whitespace is part of the query,
    /// so `"algebra "` does not match a title ending in "Algebra".
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.teacher_id == user
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn cover_image_url(&self) -> Option<&str> {
        self.cover_image_url.as_deref()
    }

    #[must_use]
    pub fn teacher_id(&self) -> UserId {
        self.teacher_id
    }

    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    /// Only published lessons are visible to students.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.is_published
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
