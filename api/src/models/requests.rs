use chrono::NaiveDateTime;
use serde_json;
use stride_db::models::FormSchema;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub organizer_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub event_date: NaiveDateTime,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub registration_deadline: Option<NaiveDateTime>,
    #[serde(default)]
    pub form_schema: Option<FormSchema>,
}

#[derive(Deserialize)]
pub struct CreateTicketTypeRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_in_cents: i64,
    #[serde(default)]
    pub currency: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub max_per_user: Option<i64>,
    #[serde(default)]
    pub sale_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub sale_end: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub ticket_type_id: Uuid,
    pub attendee: AttendeeDetails,
}

#[derive(Deserialize)]
pub struct AttendeeDetails {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateFormRequest {
    pub answers: serde_json::Value,
}

#[derive(Deserialize)]
pub struct VerifyTicketRequest {
    pub code: String,
}

#[derive(Deserialize)]
pub struct RecordVerificationRequest {
    pub verifier_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_notes_are_optional() {
        let verifier_id = Uuid::new_v4();
        let request: RecordVerificationRequest =
            serde_json::from_value(json!({ "verifier_id": verifier_id })).unwrap();
        assert_eq!(request.verifier_id, verifier_id);
        assert!(request.notes.is_none());

        let request: RecordVerificationRequest =
            serde_json::from_value(json!({ "verifier_id": verifier_id, "notes": "Manual ID check" })).unwrap();
        assert_eq!(request.notes.as_deref(), Some("Manual ID check"));
    }
}
