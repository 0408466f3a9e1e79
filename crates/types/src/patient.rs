use serde::{Deserialize, Serialize};

use crate::clinical::{Consultation, MedicalProcedure, Referral};

/// A patient record. `unique_id` is assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub unique_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_number: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Row of the patient list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub unique_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

/// Patient detail including the clinical history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientWithHistory {
    #[serde(flatten)]
    pub patient: Patient,
    #[serde(default)]
    pub consultations: Vec<Consultation>,
    #[serde(default)]
    pub medical_procedures: Vec<MedicalProcedure>,
    #[serde(default)]
    pub referrals: Vec<Referral>,
}
