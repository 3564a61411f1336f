use chrono::NaiveDateTime;
use diesel;
use diesel::expression::dsl;
use diesel::prelude::*;
use models::*;
use schema::form_responses;
use serde_json;
use utils::errors::*;
use uuid::Uuid;

/// The answers a registrant gave to the event's registration questions.
/// One row per registration; repeat submissions replace the answer map.
#[derive(Clone, Debug, Identifiable, Associations, PartialEq, Queryable, Serialize)]
#[belongs_to(Registration)]
pub struct FormResponse {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub answers: serde_json::Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl FormResponse {
    pub fn find_by_registration(
        registration_id: Uuid,
        conn: &PgConnection,
    ) -> Result<Option<FormResponse>, DatabaseError> {
        form_responses::table
            .filter(form_responses::registration_id.eq(registration_id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find form response")
            .optional()
    }

    /// Validates the answers against the event's form schema and upserts
    /// them. Validation failures never reach the table, so a failed save
    /// leaves any earlier answers intact.
    pub fn upsert(
        registration: &Registration,
        answers: serde_json::Value,
        current_user_id: Option<Uuid>,
        conn: &PgConnection,
    ) -> Result<FormResponse, DatabaseError> {
        let event = registration.event(conn)?;
        if let Some(schema) = event.form_schema()? {
            schema.validate_answers(&answers)?;
        }

        let response: FormResponse = diesel::insert_into(form_responses::table)
            .values((
                form_responses::registration_id.eq(registration.id),
                form_responses::answers.eq(&answers),
            ))
            .on_conflict(form_responses::registration_id)
            .do_update()
            .set((
                form_responses::answers.eq(&answers),
                form_responses::updated_at.eq(dsl::now),
            ))
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not save form response")?;

        DomainEvent::create(
            DomainEventTypes::FormResponseSaved,
            "Form response saved".to_string(),
            Tables::FormResponses,
            Some(registration.id),
            current_user_id,
            None,
        )
        .commit(conn)?;

        Ok(response)
    }
}
