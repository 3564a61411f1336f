use crate::db::Connection;
use crate::errors::ApiError;
use crate::extractors::Json;
use crate::helpers::application;
use crate::models::{CreateTicketTypeRequest, DisplayTicketType, PathParameters};
use crate::server::GetAppState;
use actix_web::{web::Path, HttpRequest, HttpResponse};
use stride_db::prelude::*;

pub async fn create(
    (connection, parameters, request, http_request): (
        Connection,
        Path<PathParameters>,
        Json<CreateTicketTypeRequest>,
        HttpRequest,
    ),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let state = http_request.state();
    let event = Event::find(parameters.id, connection)?;
    let request = request.into_inner();

    let currency = request
        .currency
        .unwrap_or_else(|| state.config.primary_currency.clone());
    let ticket_type = TicketType::create(
        event.id,
        request.name,
        request.description,
        request.price_in_cents,
        currency,
        request.quantity,
        request.max_per_user,
        request.sale_start,
        request.sale_end,
    )
    .commit(connection)?;

    application::created(json!(ticket_type))
}

pub async fn index((connection, parameters): (Connection, Path<PathParameters>)) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let event = Event::find(parameters.id, connection)?;

    let mut ticket_types = Vec::new();
    for ticket_type in event.ticket_types(connection)? {
        ticket_types.push(DisplayTicketType::from_ticket_type(&ticket_type, connection)?);
    }

    Ok(HttpResponse::Ok().json(&ticket_types))
}
