use serde::{Deserialize, Serialize};

/// Minimal identity of the signed-in doctor, always derived from a [`DoctorProfile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend primary key of the doctor
    pub id: i64,
    /// Login email
    pub email: String,
    /// Display name shown in headers
    pub full_name: String,
    /// Medical specialty
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Full profile record of the signed-in doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Clinics the doctor is affiliated with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workplaces: Option<Vec<Workplace>>,
}

impl From<&DoctorProfile> for User {
    fn from(profile: &DoctorProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            specialty: profile.specialty.clone(),
            phone_number: profile.phone_number.clone(),
            address: profile.address.clone(),
        }
    }
}

/// A clinic or practice location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workplace {
    pub id: i64,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub is_public: bool,
    /// Doctor who registered the workplace
    #[serde(default)]
    pub creator: Option<i64>,
}

/// Body of a profile edit. Workplaces are sent as ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialty: String,
    pub license_number: String,
    pub phone_number: String,
    pub address: String,
    pub workplaces: Vec<i64>,
}

impl ProfileUpdate {
    /// Pre-fill an edit from the current profile. The first word of the full
    /// name becomes the first name, the remainder the last name.
    pub fn from_profile(profile: &DoctorProfile) -> Self {
        let mut parts = profile.full_name.split_whitespace();
        let first_name = parts.next().unwrap_or_default().to_string();
        let last_name = parts.collect::<Vec<_>>().join(" ");

        Self {
            first_name,
            last_name,
            email: profile.email.clone(),
            specialty: profile.specialty.clone().unwrap_or_default(),
            license_number: profile.license_number.clone().unwrap_or_default(),
            phone_number: profile.phone_number.clone().unwrap_or_default(),
            address: profile.address.clone().unwrap_or_default(),
            workplaces: profile
                .workplaces
                .iter()
                .flatten()
                .map(|workplace| workplace.id)
                .collect(),
        }
    }
}

/// What the backend returns after a profile edit. Names come back split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdateResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub workplaces: Option<Vec<Workplace>>,
}

impl From<ProfileUpdateResponse> for DoctorProfile {
    fn from(response: ProfileUpdateResponse) -> Self {
        let full_name = format!("{} {}", response.first_name, response.last_name)
            .trim()
            .to_string();

        Self {
            id: response.id,
            full_name,
            email: response.email,
            specialty: response.specialty,
            license_number: response.license_number,
            phone_number: response.phone_number,
            address: response.address,
            workplaces: response.workplaces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DoctorProfile {
        DoctorProfile {
            id: 7,
            full_name: "Amina Ben Salah".into(),
            email: "amina@clinic.test".into(),
            specialty: Some("Cardiology".into()),
            license_number: None,
            phone_number: Some("+216 22 000 000".into()),
            address: None,
            workplaces: Some(vec![Workplace {
                id: 3,
                name: "Clinique du Lac".into(),
                address: "Tunis".into(),
                is_public: true,
                creator: Some(7),
            }]),
        }
    }

    #[test]
    fn user_is_projected_from_profile() {
        let user = User::from(&profile());
        assert_eq!(user.id, 7);
        assert_eq!(user.full_name, "Amina Ben Salah");
        assert_eq!(user.specialty.as_deref(), Some("Cardiology"));
    }

    #[test]
    fn profile_update_splits_full_name_and_collects_workplace_ids() {
        let update = ProfileUpdate::from_profile(&profile());
        assert_eq!(update.first_name, "Amina");
        assert_eq!(update.last_name, "Ben Salah");
        assert_eq!(update.license_number, "");
        assert_eq!(update.workplaces, vec![3]);
    }

    #[test]
    fn update_response_rebuilds_full_name() {
        let response = ProfileUpdateResponse {
            id: 7,
            first_name: "Amina".into(),
            last_name: "Trabelsi".into(),
            email: "amina@clinic.test".into(),
            specialty: None,
            license_number: None,
            phone_number: None,
            address: None,
            workplaces: None,
        };

        let profile = DoctorProfile::from(response);
        assert_eq!(profile.full_name, "Amina Trabelsi");
    }

    #[test]
    fn profile_deserialises_without_workplaces() {
        let profile: DoctorProfile = serde_json::from_value(serde_json::json!({
            "id": 1,
            "full_name": "Karim Haddad",
            "email": "karim@clinic.test",
            "specialty": null,
            "license_number": "TN-1234",
            "phone_number": null,
            "address": null
        }))
        .expect("profile should deserialise");

        assert!(profile.workplaces.is_none());
        assert_eq!(profile.license_number.as_deref(), Some("TN-1234"));
    }
}
