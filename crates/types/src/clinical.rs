use serde::{Deserialize, Serialize};

use crate::identity::{DoctorProfile, Workplace};
use crate::patient::Patient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    /// Patient `unique_id`
    pub patient: String,
    pub doctor: i64,
    pub appointment_date: String,
    pub reason_for_appointment: String,
    pub status: String,
    pub workplace: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_details: Option<AppointmentPatient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workplace_details: Option<AppointmentWorkplace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentPatient {
    pub unique_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentWorkplace {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Archive entry kept by the backend when an appointment is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedAppointment {
    pub id: i64,
    /// Id of the appointment before deletion
    pub appointment_id: i64,
    pub patient_details: Patient,
    pub doctor_details: DoctorProfile,
    pub workplace_details: Workplace,
    pub appointment_date: String,
    pub reason_for_appointment: String,
    pub deletion_date: String,
    pub deletion_reason: String,
    #[serde(default)]
    pub deletion_comment: Option<String>,
    pub deleted_by_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: i64,
    pub patient: String,
    pub doctor: i64,
    pub consultation_date: String,
    pub reason_for_consultation: String,
    #[serde(default)]
    pub medical_report: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    /// Oxygen saturation
    #[serde(default)]
    pub sp2: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub blood_pressure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalProcedure {
    pub id: i64,
    pub patient: String,
    /// Doctor who performed the procedure
    pub operator: i64,
    pub procedure_type: String,
    pub procedure_date: String,
    #[serde(default)]
    pub result: Option<String>,
    /// URL of the attached file
    #[serde(default)]
    pub attachments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: i64,
    pub patient: String,
    pub referred_to: i64,
    pub referred_by: i64,
    pub specialty_requested: String,
    pub reason_for_referral: String,
    #[serde(default)]
    pub attached_documents: Option<String>,
    #[serde(default)]
    pub date_of_referral: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_to_details: Option<DoctorProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by_details: Option<DoctorProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_details: Option<Patient>,
}
