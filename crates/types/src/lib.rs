//! # medcab types
//!
//! Plain records mirroring the JSON the practice backend sends and accepts.
//! The backend is authoritative for every entity here; these types carry no
//! behaviour beyond a few projections the session layer relies on.
//!
//! - **identity**: the signed-in doctor (`User`, `DoctorProfile`) and profile edits
//! - **auth**: credentials, token pairs and registration payloads
//! - **patient**, **clinical**, **community**, **stats**: opaque entity DTOs

pub mod auth;
pub mod clinical;
pub mod community;
pub mod identity;
pub mod patient;
pub mod stats;

pub use auth::{AuthTokens, Credentials, Registration};
pub use clinical::{
    Appointment, AppointmentPatient, AppointmentWorkplace, Consultation, DeletedAppointment,
    MedicalProcedure, Referral,
};
pub use community::{ForumComment, ForumPost, NewForumComment, NewForumPost, Note};
pub use identity::{DoctorProfile, ProfileUpdate, ProfileUpdateResponse, User, Workplace};
pub use patient::{Patient, PatientSummary, PatientWithHistory};
pub use stats::{DoctorStats, GlobalStats, PatientStat, PracticeStats, WorkplaceStats};
