use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::UserId;
use crate::model::text::{optional_text, required_text};

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

/// Which side of the platform a profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    /// Stable storage/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    /// Human-readable label for profile screens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
        }
    }

    #[must_use]
    pub const fn is_teacher(self) -> bool {
        matches!(self, Role::Teacher)
    }

    #[must_use]
    pub const fn is_student(self) -> bool {
        matches!(self, Role::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("full name cannot be empty")]
    EmptyFullName,

    #[error("students must have a grade")]
    MissingGrade,
}

/// Public record of a signed-up user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    id: UserId,
    email: String,
    full_name: String,
    role: Role,
    grade: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a profile for a freshly created account.
    ///
    /// Teachers never carry a grade; any grade passed for them is dropped.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if email or name are blank, or a student has no grade.
    pub fn new(
        id: UserId,
        email: impl AsRef<str>,
        full_name: impl AsRef<str>,
        role: Role,
        grade: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        let email = required_text(email.as_ref()).ok_or(ProfileError::EmptyEmail)?;
        let full_name = required_text(full_name.as_ref()).ok_or(ProfileError::EmptyFullName)?;
        let grade = match role {
            Role::Student => Some(grade.and_then(optional_text).ok_or(ProfileError::MissingGrade)?),
            Role::Teacher => None,
        };

        Ok(Self {
            id,
            email,
            full_name,
            role,
            grade,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a profile from storage without re-running sign-up rules.
    #[must_use]
    pub fn from_persisted(
        id: UserId,
        email: String,
        full_name: String,
        role: Role,
        grade: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            full_name,
            role,
            grade,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn is_teacher(&self) -> bool {
        self.role.is_teacher()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn student_requires_grade() {
        let err = Profile::new(
            UserId::generate(),
            "s@example.com",
            "Sara",
            Role::Student,
            Some("  "),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ProfileError::MissingGrade);
    }

    #[test]
    fn teacher_grade_is_dropped() {
        let profile = Profile::new(
            UserId::generate(),
            "t@example.com",
            " Omar ",
            Role::Teacher,
            Some("Grade 10"),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(profile.grade(), None);
        assert_eq!(profile.full_name(), "Omar");
        assert!(profile.is_teacher());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Student, Role::Teacher] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }
}
