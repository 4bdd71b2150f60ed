//! Role gate: which navigation sections a signed-in profile may see.
//!
//! Everything here is a pure function of the current profile and is meant to
//! be re-evaluated on every render.

use crate::model::{Lesson, Profile, Role};

/// Top-level navigation sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Home,
    Lessons,
    MyLessons,
    TeacherDashboard,
    Profile,
}

/// Who a section is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Students,
    Teachers,
}

impl Section {
    /// Tab order.
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::Lessons,
        Section::MyLessons,
        Section::TeacherDashboard,
        Section::Profile,
    ];

    #[must_use]
    pub const fn audience(self) -> Audience {
        match self {
            Section::Home | Section::Lessons | Section::Profile => Audience::Everyone,
            Section::MyLessons => Audience::Students,
            Section::TeacherDashboard => Audience::Teachers,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::Lessons => "Lessons",
            Section::MyLessons => "My Lessons",
            Section::TeacherDashboard => "Dashboard",
            Section::Profile => "Account",
        }
    }
}

/// Returns whether `section` is shown for `profile`.
///
/// Without a loaded profile only shared sections are visible.
#[must_use]
pub fn is_visible(section: Section, profile: Option<&Profile>) -> bool {
    let role = profile.map(Profile::role);
    match section.audience() {
        Audience::Everyone => true,
        Audience::Students => role == Some(Role::Student),
        Audience::Teachers => role == Some(Role::Teacher),
    }
}

/// Visible sections in tab order.
#[must_use]
pub fn visible_sections(profile: Option<&Profile>) -> Vec<Section> {
    Section::ALL
        .into_iter()
        .filter(|section| is_visible(*section, profile))
        .collect()
}

/// A lesson (and its videos) may only be changed by the teacher who owns it.
#[must_use]
pub fn can_manage_lesson(profile: &Profile, lesson: &Lesson) -> bool {
    profile.is_teacher() && lesson.is_owned_by(profile.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonDraft, LessonId, UserId};
    use crate::time::fixed_now;

    fn profile(role: Role) -> Profile {
        Profile::new(
            UserId::generate(),
            "user@example.com",
            "User",
            role,
            Some("Grade 9"),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn teacher_sees_dashboard_but_not_student_lessons() {
        let teacher = profile(Role::Teacher);
        assert!(is_visible(Section::TeacherDashboard, Some(&teacher)));
        assert!(!is_visible(Section::MyLessons, Some(&teacher)));
    }

    #[test]
    fn student_sees_own_lessons_but_never_dashboard() {
        let student = profile(Role::Student);
        assert!(is_visible(Section::MyLessons, Some(&student)));
        assert!(!is_visible(Section::TeacherDashboard, Some(&student)));
    }

    #[test]
    fn shared_sections_are_always_visible() {
        for section in [Section::Home, Section::Lessons, Section::Profile] {
            assert!(is_visible(section, None));
            assert!(is_visible(section, Some(&profile(Role::Student))));
            assert!(is_visible(section, Some(&profile(Role::Teacher))));
        }
    }

    #[test]
    fn no_profile_hides_role_sections() {
        assert_eq!(
            visible_sections(None),
            vec![Section::Home, Section::Lessons, Section::Profile]
        );
    }

    #[test]
    fn only_owner_teacher_manages_lesson() {
        let owner = profile(Role::Teacher);
        let other = profile(Role::Teacher);
        let draft = LessonDraft {
            title: "Physics".into(),
            ..LessonDraft::default()
        };
        let lesson = Lesson::new(LessonId::generate(), owner.id(), &draft, fixed_now()).unwrap();
        assert!(can_manage_lesson(&owner, &lesson));
        assert!(!can_manage_lesson(&other, &lesson));
    }
}
