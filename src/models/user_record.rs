//! Local user record kept by the marketplace
//!
//! Mirrors the profile fields the application stores per registration. The
//! record is refreshed from the provider on each login, but a field is only
//! overwritten when the provider actually supplies a value for it.

use serde::{Deserialize, Serialize};

use crate::suap::NormalizedProfile;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub registration: String,
    pub name: Option<String>,
    pub course: Option<String>,
    pub campus: Option<String>,
    /// Entered by the user on the profile page, never sourced from the provider
    pub phone: Option<String>,
    pub photo_url: Option<String>,
}

impl UserRecord {
    /// Create an empty record for a registration seen for the first time
    #[must_use]
    pub fn new(registration: impl Into<String>) -> Self {
        Self {
            registration: registration.into(),
            ..Self::default()
        }
    }

    /// Build a fresh record from a normalized profile
    #[must_use]
    pub fn from_profile(registration: impl Into<String>, profile: &NormalizedProfile) -> Self {
        let mut record = Self::new(registration);
        record.apply_profile(profile);
        record
    }

    /// Merge provider data into an existing record
    ///
    /// Returns `true` if any field changed.
    pub fn apply_profile(&mut self, profile: &NormalizedProfile) -> bool {
        let name = (!profile.display_name.is_empty()).then(|| profile.display_name.clone());

        let mut changed = false;
        changed |= merge_field(&mut self.name, name);
        changed |= merge_field(&mut self.course, profile.course_name.clone());
        changed |= merge_field(&mut self.campus, profile.campus_name.clone());
        changed |= merge_field(&mut self.photo_url, profile.photo_url.clone());
        changed
    }
}

fn merge_field(target: &mut Option<String>, incoming: Option<String>) -> bool {
    match incoming {
        Some(value) if target.as_deref() != Some(value.as_str()) => {
            *target = Some(value);
            true
        }
        _ => false,
    }
}
