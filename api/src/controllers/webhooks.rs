use crate::db::Connection;
use crate::errors::{ApiError, ApplicationError};
use crate::helpers::application;
use crate::server::GetAppState;
use actix_web::{web::Bytes, HttpRequest, HttpResponse};
use cashfree::{verify_webhook_signature, WebhookNotification};
use log::Level::{Debug, Warn};
use stride_db::prelude::*;

const SIGNATURE_HEADER: &str = "x-webhook-signature";
const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";

/// Cashfree payment notification. The signature is verified over the raw
/// body before anything is parsed or written; an invalid signature is
/// rejected with no side effects.
pub async fn cashfree(
    (connection, body, http_request): (Connection, Bytes, HttpRequest),
) -> Result<HttpResponse, ApiError> {
    let connection = connection.get();
    let state = http_request.state();

    let signature = match header_value(&http_request, SIGNATURE_HEADER) {
        Some(value) => value,
        None => return application::bad_request("Missing webhook signature"),
    };
    let timestamp = match header_value(&http_request, TIMESTAMP_HEADER) {
        Some(value) => value,
        None => return application::bad_request("Missing webhook timestamp"),
    };

    let raw_body = std::str::from_utf8(&body)
        .map_err(|_| ApiError::from(ApplicationError::bad_request("Invalid webhook body")))?;

    if verify_webhook_signature(state.service_locator.webhook_secret(), &timestamp, raw_body, &signature).is_err() {
        jlog!(Warn, "stride_api::webhooks", "Webhook signature verification failed", {
            "ip_address": http_request.connection_info().realip_remote_addr().map(|i| i.to_string())
        });
        return Ok(HttpResponse::Unauthorized().json(json!({"error": "Invalid signature"})));
    }

    let notification: WebhookNotification = serde_json::from_str(raw_body)?;
    jlog!(Debug, "stride_api::webhooks", "Cashfree webhook received", {
        "type": notification.type_,
        "order_id": notification.data.order.order_id
    });

    let payment = match Payment::find_by_gateway_order(&notification.data.order.order_id, connection).optional()? {
        Some(payment) => payment,
        None => {
            // Not an order of ours; acknowledge so the gateway stops retrying
            jlog!(Warn, "stride_api::webhooks", "Webhook for unknown order", {
                "order_id": notification.data.order.order_id
            });
            return Ok(HttpResponse::Ok().finish());
        }
    };

    let order_status = order_status_from_notification(&notification);
    payment.apply_gateway_status(
        order_status,
        Some(serde_json::from_str(raw_body)?),
        None,
        connection,
    )?;

    Ok(HttpResponse::Ok().finish())
}

fn header_value(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Webhooks report the payment attempt's status; the order-status words
/// the rest of the pipeline speaks are the polled-order ones.
fn order_status_from_notification(notification: &WebhookNotification) -> &'static str {
    if notification.type_ == "REFUND_WEBHOOK" {
        return "REFUNDED";
    }
    let payment_status = notification
        .data
        .payment
        .as_ref()
        .and_then(|p| p.payment_status.as_deref());
    match payment_status {
        Some("SUCCESS") => "PAID",
        Some("FAILED") | Some("USER_DROPPED") | Some("CANCELLED") => "FAILED",
        _ => "ACTIVE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(type_: &str, payment_status: Option<&str>) -> WebhookNotification {
        serde_json::from_value(json!({
            "type": type_,
            "event_time": "2026-01-10T10:00:00+05:30",
            "data": {
                "order": { "order_id": "stride-abc" },
                "payment": payment_status.map(|s| json!({ "payment_status": s }))
            }
        }))
        .unwrap()
    }

    #[test]
    fn maps_webhook_payment_status_onto_order_status() {
        assert_eq!(
            order_status_from_notification(&notification("PAYMENT_SUCCESS_WEBHOOK", Some("SUCCESS"))),
            "PAID"
        );
        assert_eq!(
            order_status_from_notification(&notification("PAYMENT_FAILED_WEBHOOK", Some("FAILED"))),
            "FAILED"
        );
        assert_eq!(
            order_status_from_notification(&notification("PAYMENT_USER_DROPPED_WEBHOOK", Some("USER_DROPPED"))),
            "FAILED"
        );
        assert_eq!(order_status_from_notification(&notification("REFUND_WEBHOOK", None)), "REFUNDED");
        // Unknown statuses leave the payment untouched downstream
        assert_eq!(
            order_status_from_notification(&notification("PAYMENT_SOMETHING_NEW", Some("PENDING"))),
            "ACTIVE"
        );
    }
}
