use medcab_types::{
    Appointment, AuthTokens, Credentials, DeletedAppointment, ForumPost, GlobalStats,
    PatientWithHistory, Registration,
};
use serde_json::json;

#[test]
fn patient_history_flattens_patient_fields() {
    let payload = json!({
        "unique_id": "PAT-0001",
        "first_name": "Leila",
        "last_name": "Mansour",
        "date_of_birth": "1984-02-11",
        "age": 40,
        "medical_history": null,
        "blood_group": "O+",
        "address": null,
        "email": null,
        "phone_number": null,
        "emergency_contact_name": null,
        "emergency_contact_number": null,
        "allergies": "penicillin",
        "consultations": [{
            "id": 12,
            "patient": "PAT-0001",
            "doctor": 7,
            "consultation_date": "2024-05-02T09:30:00Z",
            "reason_for_consultation": "follow-up",
            "medical_report": null,
            "diagnosis": "stable",
            "medications": null,
            "weight": 64.5,
            "height": 168.0,
            "sp2": 98.0,
            "temperature": 36.8,
            "blood_pressure": "12/8"
        }],
        "medical_procedures": [],
        "referrals": []
    });

    let history: PatientWithHistory =
        serde_json::from_value(payload).expect("history payload should parse");

    assert_eq!(history.patient.unique_id, "PAT-0001");
    assert_eq!(history.patient.full_name(), "Leila Mansour");
    assert_eq!(history.consultations.len(), 1);
    assert_eq!(history.consultations[0].weight, Some(64.5));
    assert!(history.referrals.is_empty());
}

#[test]
fn appointment_details_are_optional() {
    let bare: Appointment = serde_json::from_value(json!({
        "id": 4,
        "patient": "PAT-0001",
        "doctor": 7,
        "appointment_date": "2024-06-01T10:00:00Z",
        "reason_for_appointment": "check-up",
        "status": "scheduled",
        "workplace": 3
    }))
    .expect("appointment without details should parse");
    assert!(bare.patient_details.is_none());

    let encoded = serde_json::to_value(&bare).expect("appointment should serialise");
    assert!(encoded.get("patient_details").is_none());
}

#[test]
fn deleted_appointment_carries_snapshots() {
    let payload = json!({
        "id": 1,
        "appointment_id": 4,
        "patient_details": {
            "unique_id": "PAT-0001",
            "first_name": "Leila",
            "last_name": "Mansour"
        },
        "doctor_details": {
            "id": 7,
            "full_name": "Amina Ben Salah",
            "email": "amina@clinic.test"
        },
        "workplace_details": {
            "id": 3,
            "name": "Clinique du Lac",
            "address": "Tunis",
            "is_public": true,
            "creator": 7
        },
        "appointment_date": "2024-06-01T10:00:00Z",
        "reason_for_appointment": "check-up",
        "deletion_date": "2024-05-30T08:00:00Z",
        "deletion_reason": "patient request",
        "deletion_comment": null,
        "deleted_by_name": "Amina Ben Salah"
    });

    let deleted: DeletedAppointment =
        serde_json::from_value(payload).expect("deleted appointment should parse");
    assert_eq!(deleted.doctor_details.full_name, "Amina Ben Salah");
    assert_eq!(deleted.workplace_details.name, "Clinique du Lac");
}

#[test]
fn forum_post_defaults_missing_comments() {
    let post: ForumPost = serde_json::from_value(json!({
        "id": 9,
        "author_name": "Karim Haddad",
        "author_specialty": "Neurology",
        "title": "Migraine protocols",
        "content": "Any updated guidance?",
        "created_at": "2024-04-01T12:00:00Z"
    }))
    .expect("post should parse");

    assert!(post.comments.is_empty());
}

#[test]
fn global_stats_parse_nested_breakdowns() {
    let stats: GlobalStats = serde_json::from_value(json!({
        "total_doctors": 2,
        "total_workplaces": 1,
        "total_patients": 30,
        "total_consultations": 85,
        "total_referrals": 4,
        "total_procedures": 9,
        "stats_by_workplace": [{
            "id": 3, "name": "Clinique du Lac",
            "consultation_count": 85, "patient_count": 30, "procedure_count": 9
        }],
        "stats_by_doctor": [{
            "id": 7, "full_name": "Amina Ben Salah", "specialty": "Cardiology",
            "consultation_count": 50, "patient_count": 20,
            "referral_count": 3, "procedure_count": 5
        }]
    }))
    .expect("global stats should parse");

    assert_eq!(stats.stats_by_workplace[0].patient_count, 30);
    assert_eq!(stats.stats_by_doctor[0].referral_count, 3);
}

#[test]
fn secrets_are_redacted_from_debug_output() {
    let credentials = Credentials::new("amina@clinic.test", "hunter22");
    let rendered = format!("{credentials:?}");
    assert!(rendered.contains("amina@clinic.test"));
    assert!(!rendered.contains("hunter22"));

    let registration = Registration {
        first_name: "Amina".into(),
        last_name: "Ben Salah".into(),
        email: "amina@clinic.test".into(),
        password: "hunter22".into(),
        license_number: "TN-1".into(),
        specialty: String::new(),
        registration_code: "CODE-123456".into(),
    };
    let rendered = format!("{registration:?}");
    assert!(!rendered.contains("hunter22"));
    assert!(!rendered.contains("CODE-123456"));
}

#[test]
fn auth_tokens_accept_missing_refresh() {
    let tokens: AuthTokens =
        serde_json::from_value(json!({ "access": "abc.def.ghi" })).expect("tokens should parse");
    assert_eq!(tokens.access, "abc.def.ghi");
    assert!(tokens.refresh.is_none());
}
