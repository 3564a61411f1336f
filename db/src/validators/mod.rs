mod number_validators;
mod start_date_before_end_date_validator;

pub use self::number_validators::*;
pub use self::start_date_before_end_date_validator::start_date_valid;
use std::borrow::Cow;
use validator::*;

pub fn create_validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

pub fn append_validation_error(
    validation_errors: Result<(), ValidationErrors>,
    field: &'static str,
    validation_error: Result<(), ValidationError>,
) -> Result<(), ValidationErrors> {
    if let Err(validation_error) = validation_error {
        let mut validation_errors = match validation_errors {
            Ok(_) => ValidationErrors::new(),
            Err(validation_errors) => validation_errors,
        };
        validation_errors.add(field, validation_error);
        Err(validation_errors)
    } else {
        validation_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_collects_multiple_fields() {
        let result = append_validation_error(Ok(()), "quantity", Ok(()));
        assert!(result.is_ok());

        let result = append_validation_error(
            Ok(()),
            "quantity",
            Err(create_validation_error("quantity_invalid", "Quantity must be positive")),
        );
        let result = append_validation_error(
            result,
            "sale_start",
            Err(create_validation_error("sale_start_after_end", "Sale must start before it ends")),
        );
        let validation_errors = result.unwrap_err();
        let errors = validation_errors.field_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("quantity"));
        assert!(errors.contains_key("sale_start"));
    }
}
