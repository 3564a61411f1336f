use crate::errors::*;
use crate::payments::PaymentProcessorError;
use actix_web::http::StatusCode;
use actix_web::{error::ResponseError, HttpResponse};
use cashfree::CashfreeError;
use diesel::result::Error as DieselError;
use serde_json::Error as SerdeError;
use std::error::Error;
use std::fmt;
use stride_db::utils::errors::*;
use uuid::Error as UuidError;

#[derive(Debug)]
pub struct ApiError(Box<dyn ConvertToWebError + Send + Sync>);

macro_rules! error_conversion {
    ($e: ty) => {
        impl From<$e> for ApiError {
            fn from(e: $e) -> Self {
                ApiError(Box::new(e))
            }
        }
    };
}

error_conversion!(ApplicationError);
error_conversion!(CashfreeError);
error_conversion!(DatabaseError);
error_conversion!(DieselError);
error_conversion!(EnumParseError);
error_conversion!(NotFoundError);
error_conversion!(PaymentProcessorError);
error_conversion!(SerdeError);
error_conversion!(UuidError);
error_conversion!(r2d2::Error);
error_conversion!(std::io::Error);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&*self.0.to_string())
    }
}

impl Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.0.status_code()
    }
    fn error_response(&self) -> HttpResponse {
        self.0.to_response()
    }
}

impl ApiError {
    pub fn new(inner: Box<dyn ConvertToWebError + Send + Sync>) -> ApiError {
        ApiError(inner)
    }

    pub fn into_inner(&self) -> &dyn ConvertToWebError {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_map_onto_http_statuses() {
        let duplicate: ApiError = DatabaseError::new(
            ErrorCode::DuplicateKeyError,
            Some("User already has an active registration for this event".to_string()),
        )
        .into();
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

        let missing: ApiError = DatabaseError::new(ErrorCode::NoResults, None).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let business: ApiError =
            DatabaseError::new(ErrorCode::BusinessProcessError, Some("Ticket type is sold out".to_string())).into();
        assert_eq!(business.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn not_found_maps_to_404() {
        let error: ApiError = NotFoundError {}.into();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "Not found");
    }
}
