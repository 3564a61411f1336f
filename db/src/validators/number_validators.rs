use std::borrow::Cow;
use validator::ValidationError;
use validators::create_validation_error;

pub fn validate_greater_than<T: std::cmp::Ord + serde::Serialize>(
    a: T,
    b: T,
    code: &'static str,
    msg: &'static str,
) -> Result<(), ValidationError> {
    use std::cmp::Ordering::*;

    match a.cmp(&b) {
        Less | Equal => {
            let mut validation_error = create_validation_error(code, msg);
            validation_error.add_param(Cow::from(code), &a);
            Err(validation_error)
        }
        _ => Ok(()),
    }
}

pub fn validate_greater_than_or_equal<T: std::cmp::Ord + serde::Serialize>(
    a: T,
    b: T,
    code: &'static str,
    msg: &'static str,
) -> Result<(), ValidationError> {
    use std::cmp::Ordering::*;

    match a.cmp(&b) {
        Less => {
            let mut validation_error = create_validation_error(code, msg);
            validation_error.add_param(Cow::from(code), &a);
            Err(validation_error)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greater_than() {
        assert!(validate_greater_than(5, 0, "quantity_invalid", "Quantity must be positive").is_ok());
        assert!(validate_greater_than(0, 0, "quantity_invalid", "Quantity must be positive").is_err());
        assert!(validate_greater_than(-1, 0, "quantity_invalid", "Quantity must be positive").is_err());
    }

    #[test]
    fn greater_than_or_equal() {
        assert!(validate_greater_than_or_equal(0, 0, "price_invalid", "Price may not be negative").is_ok());
        assert!(validate_greater_than_or_equal(-50, 0, "price_invalid", "Price may not be negative").is_err());
    }
}
