use crate::db::Connection;
use crate::errors::{ApiError, ApplicationError};
use crate::extractors::Json;
use crate::helpers::application;
use crate::models::{DisplayRegistration, PathParameters, RegisterRequest, UpdateFormRequest};
use crate::workflow::{self, WorkflowEffect, WorkflowInput};
use actix_web::{web::Path, HttpResponse};
use diesel::PgConnection;
use stride_db::prelude::*;

/// Ticket selection. Creates the pending registration that anchors the
/// rest of the flow; duplicate and sold-out conflicts surface here.
pub async fn register(
    (connection, parameters, request): (Connection, Path<PathParameters>, Json<RegisterRequest>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let request = request.into_inner();

    let user = match User::find_by_email(&request.attendee.email, connection)? {
        Some(user) => user.update_contact_details(request.attendee.name, request.attendee.phone, connection)?,
        None => User::create(
            request.attendee.external_id,
            request.attendee.email,
            request.attendee.name,
            request.attendee.phone,
        )
        .commit(connection)?,
    };

    let registration =
        Registration::create(parameters.id, user.id, request.ticket_type_id).commit(Some(user.id), connection)?;

    application::created(json!(DisplayRegistration::from_registration(&registration, connection)?))
}

pub async fn show((connection, parameters): (Connection, Path<PathParameters>)) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let registration = Registration::find(parameters.id, connection)?;
    Ok(HttpResponse::Ok().json(&DisplayRegistration::from_registration(&registration, connection)?))
}

/// Upserts the attendee's answers. Validation happens against the
/// event's form schema before anything is written.
pub async fn update_form(
    (connection, parameters, request): (Connection, Path<PathParameters>, Json<UpdateFormRequest>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let registration = Registration::find(parameters.id, connection)?;
    if registration.status == RegistrationStatus::Cancelled {
        return application::unprocessable("Registration has been cancelled");
    }

    let response = FormResponse::upsert(
        &registration,
        request.into_inner().answers,
        Some(registration.user_id),
        connection,
    )?;
    Ok(HttpResponse::Ok().json(&response))
}

/// Completes a free registration. Paid tiers get a 422 pointing the
/// client at the payment flow; sequencing is decided by the workflow
/// machine, so completing before the form is in (or twice) is rejected.
pub async fn complete(
    (connection, parameters): (Connection, Path<PathParameters>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let registration = Registration::find(parameters.id, connection)?;
    let ticket_type = registration.ticket_type(connection)?;

    if !ticket_type.is_free() {
        return application::unprocessable("Ticket type requires payment");
    }

    let state = match registration_state(&registration, true, connection)? {
        Some(state) => state,
        None => return application::unprocessable("Registration has been cancelled"),
    };
    let (_, effects) = workflow::step(state, WorkflowInput::ConfirmReview)
        .map_err(|e| ApplicationError::unprocessable(&e.to_string()))?;

    let mut registration = registration;
    if effects.contains(&WorkflowEffect::FinalizeRegistration) {
        registration = registration.complete_free(Some(registration.user_id), connection)?;
    }
    Ok(HttpResponse::Ok().json(&DisplayRegistration::from_registration(&registration, connection)?))
}

/// Answers count as complete when they have been saved, or when the event
/// never asked for any.
pub fn registration_state(
    registration: &Registration,
    free: bool,
    conn: &PgConnection,
) -> Result<Option<workflow::WorkflowState>, ApiError> {
    let event = registration.event(conn)?;
    let answers_complete =
        event.form_schema()?.is_none() || FormResponse::find_by_registration(registration.id, conn)?.is_some();
    Ok(workflow::derive_state(registration.status, answers_complete, free))
}
