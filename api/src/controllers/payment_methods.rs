use crate::errors::ApiError;
use crate::server::GetAppState;
use actix_web::{HttpRequest, HttpResponse};

pub async fn index(http_request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let state = http_request.state();
    let processor = state.service_locator.create_payment_processor();

    Ok(HttpResponse::Ok().json(json!([
        {
            "provider": processor.name(),
            "currency": state.config.primary_currency,
            "methods": ["upi", "card", "netbanking", "wallet"],
        },
        {
            "provider": "Free",
            "currency": state.config.primary_currency,
            "methods": [],
        }
    ])))
}
