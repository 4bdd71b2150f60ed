use lessons_core::model::Profile;

/// Hour-of-day greeting on the home screen.
#[must_use]
pub fn greeting_for_hour(hour: u32) -> &'static str {
    if hour < 12 { "Good morning" } else { "Good evening" }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileVm {
    pub full_name: String,
    pub email: String,
    pub role_label: &'static str,
    pub grade: Option<String>,
    pub initial: String,
}

impl From<&Profile> for ProfileVm {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name().to_owned(),
            email: profile.email().to_owned(),
            role_label: profile.role().label(),
            grade: profile.grade().map(str::to_owned),
            initial: profile
                .full_name()
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
        }
    }
}
