use crate::errors::*;
use crate::payments::PaymentProcessorError;
use actix_web::{http::StatusCode, HttpResponse};
use cashfree::CashfreeError;
use diesel::result::Error as DieselError;
use r2d2;
use serde_json::Error as SerdeError;
use std::error::Error;
use std::fmt::Debug;
use std::string::ToString;
use stride_db::utils::errors::ErrorCode::ValidationError;
use stride_db::utils::errors::*;
use uuid::Error as UuidError;

pub trait ConvertToWebError: Debug + Error + ToString {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
    fn to_response(&self) -> HttpResponse;
}

fn internal_error(message: &str) -> HttpResponse {
    status_code_and_message(StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn status_code_and_message(code: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(code).json(json!({"error": message.to_string()}))
}

impl ConvertToWebError for DieselError {
    fn to_response(&self) -> HttpResponse {
        error!("Diesel error: {}", self);
        internal_error("Internal error")
    }
}

impl ConvertToWebError for r2d2::Error {
    fn to_response(&self) -> HttpResponse {
        error!("R2D2 error: {}", self);
        internal_error("Internal error")
    }
}

impl ConvertToWebError for CashfreeError {
    fn to_response(&self) -> HttpResponse {
        error!("Cashfree error: {}", self);
        internal_error("Payment gateway error")
    }
}

impl ConvertToWebError for NotFoundError {
    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
    fn to_response(&self) -> HttpResponse {
        status_code_and_message(StatusCode::NOT_FOUND, "Not found")
    }
}

impl ConvertToWebError for UuidError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
    fn to_response(&self) -> HttpResponse {
        warn!("UUID parse error: {}", self);
        status_code_and_message(StatusCode::BAD_REQUEST, "Invalid identifier")
    }
}

impl ConvertToWebError for SerdeError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
    fn to_response(&self) -> HttpResponse {
        warn!("Serialization error: {}", self);
        status_code_and_message(StatusCode::BAD_REQUEST, "Invalid payload")
    }
}

impl ConvertToWebError for std::io::Error {
    fn to_response(&self) -> HttpResponse {
        error!("IO error: {}", self);
        internal_error("Internal error")
    }
}

impl ConvertToWebError for EnumParseError {
    fn to_response(&self) -> HttpResponse {
        error!("Enum parse error: {}", self);
        internal_error("Internal error")
    }
}

impl ConvertToWebError for PaymentProcessorError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }
    fn to_response(&self) -> HttpResponse {
        error!("Payment processor error: {}", self);
        status_code_and_message(StatusCode::BAD_GATEWAY, "Unable to process payment")
    }
}

impl ConvertToWebError for ApplicationError {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            ApplicationErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApplicationErrorType::BadRequest => StatusCode::BAD_REQUEST,
            ApplicationErrorType::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
    fn to_response(&self) -> HttpResponse {
        match self.error_type {
            ApplicationErrorType::Internal => {
                error!("Application error: {}", self.reason);
                internal_error("Internal error")
            }
            _ => status_code_and_message(self.status_code(), &self.reason),
        }
    }
}

impl ConvertToWebError for DatabaseError {
    fn status_code(&self) -> StatusCode {
        match self.code {
            1000 | 1100 => StatusCode::BAD_REQUEST,
            2000 => StatusCode::NOT_FOUND,
            3400 => StatusCode::CONFLICT,
            7000 | 7200 => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    fn to_response(&self) -> HttpResponse {
        let message = match self.code {
            1000 => "Invalid input",
            1100 => "Missing input",
            2000 => "No results",
            3000 => "Query error",
            3100 => "Could not insert record",
            3200 => "Could not update record",
            3300 => "Could not delete record",
            3400 => self
                .cause
                .as_ref()
                .map(|s| s.as_str())
                .unwrap_or("Duplicate record exists"),
            4000 => "Connection error",
            7000 => self.cause.as_ref().map(|s| s.as_str()).unwrap_or("Unknown cause"),
            7200 => match &self.error_code {
                ValidationError { errors } => {
                    return HttpResponse::UnprocessableEntity()
                        .json(json!({"error": "Validation error".to_string(), "fields": errors}))
                }
                _ => "Validation error",
            },
            5000 | 7300 => "Internal error",
            _ => "Unknown error",
        };
        status_code_and_message(self.status_code(), message)
    }
}
