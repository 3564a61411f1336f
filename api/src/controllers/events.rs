use crate::db::Connection;
use crate::errors::ApiError;
use crate::extractors::Json;
use crate::helpers::application;
use crate::models::{CreateEventRequest, PathParameters};
use actix_web::{web::Path, HttpResponse};
use stride_db::prelude::*;

pub async fn index(connection: Connection) -> Result<HttpResponse, ApiError> {
    let events = Event::published(connection.get())?;
    Ok(HttpResponse::Ok().json(&events))
}

pub async fn create(
    (connection, new_event): (Connection, Json<CreateEventRequest>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let request = new_event.into_inner();

    let event = Event::create(
        request.organizer_id,
        request.title,
        request.description,
        request.location,
        request.event_date,
        request.capacity,
        request.registration_deadline,
        request.form_schema,
    )
    .commit(Some(request.organizer_id), connection)?;

    application::created(json!(event))
}

pub async fn show((connection, parameters): (Connection, Path<PathParameters>)) -> Result<HttpResponse, ApiError> {
    let event = Event::find(parameters.id, connection.get())?;
    Ok(HttpResponse::Ok().json(&event))
}

pub async fn update(
    (connection, parameters, attributes): (Connection, Path<PathParameters>, Json<EventEditableAttributes>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let event = Event::find(parameters.id, connection)?;
    let event = event.update(attributes.into_inner(), None, connection)?;
    Ok(HttpResponse::Ok().json(&event))
}

pub async fn publish(
    (connection, parameters): (Connection, Path<PathParameters>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let event = Event::find(parameters.id, connection)?;
    let event = event.publish(None, connection)?;
    Ok(HttpResponse::Ok().json(&event))
}

pub async fn cancel(
    (connection, parameters): (Connection, Path<PathParameters>),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let event = Event::find(parameters.id, connection)?;
    let event = event.cancel(None, connection)?;
    Ok(HttpResponse::Ok().json(&event))
}
