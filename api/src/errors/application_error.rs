use std::error::Error;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ApplicationErrorType {
    Internal,
    BadRequest,
    Unprocessable,
}

#[derive(Debug)]
pub struct ApplicationError {
    pub reason: String,
    pub error_type: ApplicationErrorType,
}

impl ApplicationError {
    pub fn new(reason: String) -> ApplicationError {
        ApplicationError {
            reason,
            error_type: ApplicationErrorType::Internal,
        }
    }

    pub fn unprocessable(reason: &str) -> ApplicationError {
        ApplicationError {
            reason: reason.to_string(),
            error_type: ApplicationErrorType::Unprocessable,
        }
    }

    pub fn bad_request(reason: &str) -> ApplicationError {
        ApplicationError {
            reason: reason.to_string(),
            error_type: ApplicationErrorType::BadRequest,
        }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.reason)
    }
}

impl Error for ApplicationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_reason() {
        let error = ApplicationError::unprocessable("Ticket type requires payment");
        assert_eq!(error.to_string(), "Ticket type requires payment");
        assert_eq!(error.error_type, ApplicationErrorType::Unprocessable);
    }
}
