use crate::db::Connection;
use crate::errors::ApiError;
use crate::extractors::Json;
use crate::helpers::application;
use crate::models::{PathParameters, RecordVerificationRequest, VerifyTicketRequest};
use actix_web::{web::Path, HttpResponse};
use stride_db::prelude::*;

/// Resolves a scanned QR payload to the ticket and its holder. Lookup
/// only; redemption happens through the verifications endpoint.
pub async fn verify(
    (connection, request): (Connection, Json<VerifyTicketRequest>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();

    let ticket = match DigitalTicket::find_by_code(&request.code, connection)? {
        Some(ticket) => ticket,
        None => return application::not_found(),
    };

    let registration = Registration::find(ticket.registration_id, connection)?;
    let user = User::find(ticket.user_id, connection)?;
    let event = Event::find(ticket.event_id, connection)?;
    let ticket_type = TicketType::find(ticket.ticket_type_id, connection)?;

    Ok(HttpResponse::Ok().json(json!({
        "ticket": {
            "id": ticket.id,
            "code": ticket.code,
            "redeemed": ticket.is_redeemed(),
            "redeemed_at": ticket.redeemed_at,
        },
        "attendee": {
            "name": user.name,
            "email": user.email,
        },
        "event": {
            "id": event.id,
            "title": event.title,
            "event_date": event.event_date,
        },
        "ticket_type": ticket_type.name,
        "registration_status": registration.status,
    })))
}

/// Records a check-in attempt. Admits the holder on the first scan and
/// rejects (but still records) later ones.
pub async fn create_verification(
    (connection, parameters, request): (Connection, Path<PathParameters>, Json<RecordVerificationRequest>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();

    let ticket = DigitalTicket::find(parameters.id, connection)?;
    let request = request.into_inner();
    let verification = ticket.redeem(request.verifier_id, request.notes, connection)?;

    Ok(HttpResponse::Ok().json(json!({
        "verification_id": verification.id,
        "outcome": verification.outcome,
        "notes": verification.notes,
        "admitted": verification.outcome == CheckInOutcome::Admitted,
    })))
}
