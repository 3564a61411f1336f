use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub struct PaymentProcessorError {
    pub description: String,
    pub cause: Option<Box<dyn Error + Send + Sync>>,
}

impl PaymentProcessorError {
    pub fn new(description: String, cause: Option<Box<dyn Error + Send + Sync>>) -> PaymentProcessorError {
        PaymentProcessorError { description, cause }
    }
}

impl Error for PaymentProcessorError {}

impl fmt::Display for PaymentProcessorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match &self.cause {
            Some(c) => write!(f, "{} caused by: {}", self.description, c),
            None => write!(f, "{}", self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_cause() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let error = PaymentProcessorError::new("Could not create order".to_string(), Some(Box::new(inner)));
        assert_eq!(error.to_string(), "Could not create order caused by: connection reset");

        let bare = PaymentProcessorError::new("Could not create order".to_string(), None);
        assert_eq!(bare.to_string(), "Could not create order");
    }
}
