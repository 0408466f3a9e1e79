use serde::{Deserialize, Serialize};

/// Aggregates across every doctor and workplace (`stats/global/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_doctors: u64,
    pub total_workplaces: u64,
    pub total_patients: u64,
    pub total_consultations: u64,
    pub total_referrals: u64,
    pub total_procedures: u64,
    #[serde(default)]
    pub stats_by_workplace: Vec<WorkplaceStats>,
    #[serde(default)]
    pub stats_by_doctor: Vec<DoctorStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkplaceStats {
    pub id: i64,
    pub name: String,
    pub consultation_count: u64,
    pub patient_count: u64,
    pub procedure_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorStats {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    pub consultation_count: u64,
    pub patient_count: u64,
    pub referral_count: u64,
    pub procedure_count: u64,
}

/// Dashboard figures for the signed-in doctor (`doctors/stats/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeStats {
    pub total_patients: u64,
    pub total_consultations: u64,
    pub total_medical_procedures: u64,
    #[serde(default)]
    pub patients: Vec<PatientStat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientStat {
    pub unique_id: String,
    pub full_name: String,
    pub consultations_count: u64,
    pub medical_procedures_count: u64,
    pub referrals_count: u64,
}
