use crate::controllers::registrations::registration_state;
use crate::db::Connection;
use crate::errors::{ApiError, ApplicationError};
use crate::helpers::application;
use crate::models::{CallbackPathParameters, PathParameters};
use crate::payments::CustomerInfo;
use crate::server::GetAppState;
use crate::workflow::{self, WorkflowInput};
use actix_web::{web::Path, HttpRequest, HttpResponse};
use log::Level::Info;
use stride_db::prelude::*;
use uuid::Uuid;

/// Creates a gateway order for a pending registration and hands the
/// checkout session back to the client. Each call makes a fresh payment
/// row with a fresh gateway order; earlier failed attempts stay behind
/// as history.
pub async fn create(
    (connection, parameters, http_request): (Connection, Path<PathParameters>, HttpRequest),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let state = http_request.state();

    let registration = Registration::find(parameters.id, connection)?;
    let ticket_type = registration.ticket_type(connection)?;
    if ticket_type.is_free() {
        return application::unprocessable("Ticket type does not require payment");
    }

    let workflow_state = match registration_state(&registration, false, connection)? {
        Some(state) => state,
        None => return application::unprocessable("Registration has been cancelled"),
    };
    // This endpoint stands for confirming the review and picking the
    // gateway in one request; the machine rejects it out of order
    workflow::step(workflow_state, WorkflowInput::ConfirmReview)
        .and_then(|(state, _)| workflow::step(state, WorkflowInput::SelectPaymentMethod))
        .map_err(|e| ApplicationError::unprocessable(&e.to_string()))?;

    let user = registration.user(connection)?;
    let processor = state.service_locator.create_payment_processor();

    let order_id = format!("stride-{}", Uuid::new_v4().to_simple());
    let payment = Payment::create(
        registration.id,
        order_id.clone(),
        None,
        ticket_type.price_in_cents,
        ticket_type.currency.clone(),
        processor.name(),
    )
    .commit(Some(user.id), connection)?;

    let nonce = payment.url_nonce.clone().unwrap_or_default();
    let return_url = state.config.payment_callback_url(&nonce, payment.id);
    let notify_url = state.config.webhook_url();

    let session = match processor.create_order(
        &order_id,
        ticket_type.price_in_cents,
        &ticket_type.currency,
        CustomerInfo {
            id: user.id.to_string(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            name: user.name.clone(),
        },
        return_url,
        notify_url,
    ) {
        Ok(session) => session,
        Err(e) => {
            // The attempt is dead; the client retries with a new payment
            payment.mark_failed(None, Some(user.id), connection)?;
            return Err(e.into());
        }
    };

    let payment = payment.set_gateway_session(session.session_id.clone(), connection)?;

    application::created(json!({
        "payment_id": payment.id,
        "gateway_order_id": payment.gateway_order_id,
        "payment_session_id": session.session_id,
        "order_status": session.order_status,
        "amount": payment.amount,
        "currency": payment.currency,
    }))
}

/// The gateway's redirect back after hosted checkout. The outcome is
/// never taken from the query string; the order status is polled from
/// the gateway and applied through the same path the webhook uses.
pub async fn callback(
    (connection, parameters, http_request): (Connection, Path<CallbackPathParameters>, HttpRequest),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let state = http_request.state();

    let payment = Payment::find(parameters.id, connection)?;
    if payment.url_nonce.as_deref() != Some(parameters.nonce.as_str()) {
        return application::not_found();
    }

    let processor = state.service_locator.create_payment_processor();
    let order = processor.fetch_order(&payment.gateway_order_id)?;

    jlog!(Info, "stride_api::payments", "Callback poll result", {
        "payment_id": payment.id,
        "gateway_order_id": payment.gateway_order_id,
        "order_status": order.order_status
    });

    let payment = payment.apply_gateway_status(&order.order_status, Some(order.raw_data), None, connection)?;

    let redirect_url = format!(
        "{}/registrations/{}?payment_status={}",
        state.config.front_end_url, payment.registration_id, payment.status
    );
    application::redirect(&redirect_url)
}

/// Organizer-initiated refund. Moves the money back through the gateway
/// first; only a gateway success flips the local records.
pub async fn refund(
    (connection, parameters, http_request): (Connection, Path<PathParameters>, HttpRequest),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let state = http_request.state();

    let payment = Payment::find(parameters.id, connection)?;
    payment.check_refundable()?;

    let processor = state.service_locator.create_payment_processor();
    let refund_id = format!("refund-{}", payment.id.to_simple());
    processor.refund(&payment.gateway_order_id, &refund_id, payment.amount)?;

    let payment = payment.mark_refunded(None, connection)?;
    Ok(HttpResponse::Ok().json(json!({
        "payment_id": payment.id,
        "status": payment.status,
    })))
}
