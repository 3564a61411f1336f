use chrono::NaiveDateTime;
use std::borrow::Cow;
use validator::ValidationError;
use validators::*;

pub fn start_date_valid(
    start_date: Option<NaiveDateTime>,
    end_date: Option<NaiveDateTime>,
) -> Result<(), ValidationError> {
    if start_date.is_none() || end_date.is_none() {
        return Ok(());
    }
    if start_date >= end_date {
        let mut validation_error =
            create_validation_error("start_date_must_be_before_end_date", "Start date must be before end date");
        validation_error.add_param(Cow::from("start_date"), &start_date);
        validation_error.add_param(Cow::from("end_date"), &end_date);
        return Err(validation_error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rejects_inverted_window() {
        let earlier = NaiveDate::from_ymd(2020, 3, 1).and_hms(8, 0, 0);
        let later = NaiveDate::from_ymd(2020, 3, 15).and_hms(8, 0, 0);

        assert!(start_date_valid(Some(earlier), Some(later)).is_ok());
        assert!(start_date_valid(Some(later), Some(earlier)).is_err());
        assert!(start_date_valid(Some(earlier), Some(earlier)).is_err());
        assert!(start_date_valid(None, Some(later)).is_ok());
    }
}
