use crate::errors::*;
use actix_web::HttpResponse;
use serde_json;

// These return Err so the response carries the error and the transaction
// middleware rolls back; the error's to_response shapes the JSON body.

pub fn unprocessable(message: &str) -> Result<HttpResponse, ApiError> {
    warn!("Unprocessable: {}", message);
    Err(ApplicationError::unprocessable(message).into())
}

pub fn bad_request(message: &str) -> Result<HttpResponse, ApiError> {
    warn!("Bad request: {}", message);
    Err(ApplicationError::bad_request(message).into())
}

pub fn not_found() -> Result<HttpResponse, ApiError> {
    warn!("Not found");
    Err(NotFoundError {}.into())
}

pub fn created(json: serde_json::Value) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Created().json(json))
}

pub fn redirect(url: &str) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Found().header("Location", url).finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    #[test]
    fn error_helpers_return_errors_with_the_right_status() {
        let error = unprocessable("Ticket type requires payment").unwrap_err();
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let error = bad_request("Missing webhook signature").unwrap_err();
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let error = not_found().unwrap_err();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn created_responds_201() {
        let response = created(json!({"id": "x"})).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.error().is_none());
    }
}
