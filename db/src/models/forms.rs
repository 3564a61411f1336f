use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use validator::{validate_email, ValidationError, ValidationErrors};
use validators::*;

/// The organizer-declared registration questions for an event, stored as
/// JSONB on the event row. Each field descriptor is a tagged variant
/// carrying its own constraints, so validation is one exhaustive match
/// rather than per-type casts.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FormSchema {
    pub fields: Vec<FormField>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Renders (and validates) only when the referenced field holds the
    /// given value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<VisibilityRule>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VisibilityRule {
    pub field: String,
    pub equals: Value,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    ShortText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    MultiLineText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Email,
    Phone,
    Date,
    Time,
    SingleSelect {
        options: Vec<String>,
    },
    MultiSelect {
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_selected: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_selected: Option<usize>,
    },
    Checkbox,
    CheckboxGroup {
        options: Vec<String>,
    },
    Radio {
        options: Vec<String>,
    },
}

impl FormSchema {
    /// Validates a submitted answer map. Fields whose visibility rule is
    /// unmet are skipped entirely; required visible fields reject missing
    /// and empty values. All failures are collected under the `answers`
    /// key with the offending field id as a param.
    pub fn validate_answers(&self, answers: &Value) -> Result<(), ValidationErrors> {
        let mut validation_errors: Result<(), ValidationErrors> = Ok(());

        let answers = match answers.as_object() {
            Some(map) => map,
            None => {
                return Err(single_error("answers", field_error(
                    "answers_not_an_object",
                    "Answers must be a JSON object",
                    "answers",
                )));
            }
        };

        for field in &self.fields {
            if let Some(ref rule) = field.depends_on {
                let actual = answers.get(&rule.field).unwrap_or(&Value::Null);
                if *actual != rule.equals {
                    continue;
                }
            }

            let value = answers.get(&field.id).unwrap_or(&Value::Null);
            if is_empty_answer(value) {
                if field.required {
                    validation_errors = append_validation_error(
                        validation_errors,
                        "answers",
                        Err(field_error("required", "A required field was not answered", &field.id)),
                    );
                }
                continue;
            }

            validation_errors =
                append_validation_error(validation_errors, "answers", field.kind.validate(&field.id, value));
        }

        validation_errors
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }
}

impl FieldKind {
    fn validate(&self, field_id: &str, value: &Value) -> Result<(), ValidationError> {
        match self {
            FieldKind::ShortText {
                min_length,
                max_length,
                pattern,
            } => {
                let text = require_string(field_id, value)?;
                check_length(field_id, text, *min_length, *max_length)?;
                if let Some(pattern) = pattern {
                    let regex = Regex::new(pattern)
                        .map_err(|_| field_error("invalid_pattern", "Field pattern is not a valid expression", field_id))?;
                    if !regex.is_match(text) {
                        return Err(field_error("pattern_mismatch", "Value does not match the expected format", field_id));
                    }
                }
                Ok(())
            }
            FieldKind::MultiLineText { max_length } => {
                let text = require_string(field_id, value)?;
                check_length(field_id, text, None, *max_length)
            }
            FieldKind::Number { min, max } => {
                let number = value
                    .as_f64()
                    .ok_or_else(|| field_error("not_a_number", "Value must be a number", field_id))?;
                if let Some(min) = min {
                    if number < *min {
                        return Err(field_error("below_minimum", "Value is below the minimum", field_id));
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        return Err(field_error("above_maximum", "Value is above the maximum", field_id));
                    }
                }
                Ok(())
            }
            FieldKind::Email => {
                let text = require_string(field_id, value)?;
                if !validate_email(text) {
                    return Err(field_error("invalid_email", "Value is not a valid email address", field_id));
                }
                Ok(())
            }
            FieldKind::Phone => {
                let text = require_string(field_id, value)?;
                let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
                let acceptable = text
                    .chars()
                    .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ' || c == '(' || c == ')');
                if !acceptable || digits.len() < 7 || digits.len() > 15 {
                    return Err(field_error("invalid_phone", "Value is not a valid phone number", field_id));
                }
                Ok(())
            }
            FieldKind::Date => {
                let text = require_string(field_id, value)?;
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map(|_| ())
                    .map_err(|_| field_error("invalid_date", "Value is not a valid date", field_id))
            }
            FieldKind::Time => {
                let text = require_string(field_id, value)?;
                NaiveTime::parse_from_str(text, "%H:%M")
                    .map(|_| ())
                    .map_err(|_| field_error("invalid_time", "Value is not a valid time", field_id))
            }
            FieldKind::SingleSelect { options } | FieldKind::Radio { options } => {
                let text = require_string(field_id, value)?;
                if !options.iter().any(|o| o == text) {
                    return Err(field_error("invalid_selection", "Value is not one of the options", field_id));
                }
                Ok(())
            }
            FieldKind::MultiSelect {
                options,
                min_selected,
                max_selected,
            } => {
                let selected = require_string_array(field_id, value)?;
                check_membership(field_id, &selected, options)?;
                if let Some(min) = min_selected {
                    if selected.len() < *min {
                        return Err(field_error("too_few_selected", "Too few options selected", field_id));
                    }
                }
                if let Some(max) = max_selected {
                    if selected.len() > *max {
                        return Err(field_error("too_many_selected", "Too many options selected", field_id));
                    }
                }
                Ok(())
            }
            FieldKind::Checkbox => {
                if !value.is_boolean() {
                    return Err(field_error("not_a_boolean", "Value must be true or false", field_id));
                }
                Ok(())
            }
            FieldKind::CheckboxGroup { options } => {
                let selected = require_string_array(field_id, value)?;
                check_membership(field_id, &selected, options)
            }
        }
    }
}

/// A required checkbox (think waiver consent) is only satisfied by `true`,
/// so `false` counts as an empty answer.
fn is_empty_answer(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(b) => !b,
        _ => false,
    }
}

fn field_error(code: &'static str, message: &'static str, field_id: &str) -> ValidationError {
    let mut error = create_validation_error(code, message);
    error.add_param(Cow::from("field"), &field_id.to_string());
    error
}

fn single_error(key: &'static str, error: ValidationError) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(key, error);
    errors
}

fn require_string<'a>(field_id: &str, value: &'a Value) -> Result<&'a str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| field_error("wrong_type", "Value must be a string", field_id))
}

fn require_string_array(field_id: &str, value: &Value) -> Result<Vec<String>, ValidationError> {
    let items = value
        .as_array()
        .ok_or_else(|| field_error("wrong_type", "Value must be an array", field_id))?;
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) => result.push(s.to_string()),
            None => return Err(field_error("wrong_type", "Selections must be strings", field_id)),
        }
    }
    Ok(result)
}

fn check_length(
    field_id: &str,
    text: &str,
    min_length: Option<usize>,
    max_length: Option<usize>,
) -> Result<(), ValidationError> {
    let length = text.chars().count();
    if let Some(min) = min_length {
        if length < min {
            return Err(field_error("too_short", "Value is too short", field_id));
        }
    }
    if let Some(max) = max_length {
        if length > max {
            return Err(field_error("too_long", "Value is too long", field_id));
        }
    }
    Ok(())
}

fn check_membership(field_id: &str, selected: &[String], options: &[String]) -> Result<(), ValidationError> {
    for item in selected {
        if !options.iter().any(|o| o == item) {
            return Err(field_error("invalid_selection", "Value is not one of the options", field_id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    fn race_schema() -> FormSchema {
        serde_json::from_value(json!({
            "fields": [
                {"id": "full_name", "label": "Full name", "required": true, "type": "short_text", "min_length": 2, "max_length": 100},
                {"id": "email", "label": "Email", "required": true, "type": "email"},
                {"id": "phone", "label": "Phone", "required": false, "type": "phone"},
                {"id": "dob", "label": "Date of birth", "required": true, "type": "date"},
                {"id": "shirt_size", "label": "T-shirt size", "required": true, "type": "single_select", "options": ["S", "M", "L", "XL"]},
                {"id": "expected_pace", "label": "Expected pace (min/km)", "required": false, "type": "number", "min": 2.5, "max": 15.0},
                {"id": "waiver", "label": "I accept the waiver", "required": true, "type": "checkbox"},
                {"id": "needs_transport", "label": "Need transport?", "required": false, "type": "checkbox"},
                {"id": "pickup_point", "label": "Pickup point", "required": true, "type": "radio",
                 "options": ["North Gate", "South Gate"],
                 "depends_on": {"field": "needs_transport", "equals": true}},
                {"id": "dietary", "label": "Dietary preferences", "required": false, "type": "multi_select",
                 "options": ["Veg", "Vegan", "Jain"], "max_selected": 2}
            ]
        }))
        .unwrap()
    }

    fn valid_answers() -> Value {
        json!({
            "full_name": "Asha Rao",
            "email": "asha@example.com",
            "dob": "1990-04-21",
            "shirt_size": "M",
            "waiver": true
        })
    }

    #[test]
    fn schema_round_trips_through_serde() {
        let schema = race_schema();
        let value = serde_json::to_value(&schema).unwrap();
        let parsed: FormSchema = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, schema);
        assert_eq!(parsed.fields.len(), 10);
    }

    #[test]
    fn accepts_valid_answers() {
        assert!(race_schema().validate_answers(&valid_answers()).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut answers = valid_answers();
        answers.as_object_mut().unwrap().remove("shirt_size");
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        let errors = errors.field_errors();
        assert_eq!(errors["answers"].len(), 1);
        assert_eq!(errors["answers"][0].code, "required");
    }

    #[test]
    fn required_checkbox_must_be_true() {
        let mut answers = valid_answers();
        answers["waiver"] = json!(false);
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "required");
    }

    #[test]
    fn conditional_field_skipped_when_dependency_unmet() {
        // needs_transport is absent, so pickup_point must not be required
        assert!(race_schema().validate_answers(&valid_answers()).is_ok());
    }

    #[test]
    fn conditional_field_required_when_dependency_met() {
        let mut answers = valid_answers();
        answers["needs_transport"] = json!(true);
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "required");

        answers["pickup_point"] = json!("North Gate");
        assert!(race_schema().validate_answers(&answers).is_ok());
    }

    #[test]
    fn rejects_out_of_options_selection() {
        let mut answers = valid_answers();
        answers["shirt_size"] = json!("XXS");
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "invalid_selection");
    }

    #[test]
    fn rejects_invalid_email_and_date() {
        let mut answers = valid_answers();
        answers["email"] = json!("not-an-email");
        answers["dob"] = json!("21-04-1990");
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        let codes: Vec<&str> = errors.field_errors()["answers"].iter().map(|e| e.code.as_ref()).collect();
        assert!(codes.contains(&"invalid_email"));
        assert!(codes.contains(&"invalid_date"));
    }

    #[test]
    fn number_bounds_enforced() {
        let mut answers = valid_answers();
        answers["expected_pace"] = json!(20.0);
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "above_maximum");

        answers["expected_pace"] = json!("fast");
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "not_a_number");
    }

    #[test]
    fn multi_select_bounds_and_membership() {
        let mut answers = valid_answers();
        answers["dietary"] = json!(["Veg", "Vegan", "Jain"]);
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "too_many_selected");

        answers["dietary"] = json!(["Veg", "Beef"]);
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "invalid_selection");

        answers["dietary"] = json!(["Veg"]);
        assert!(race_schema().validate_answers(&answers).is_ok());
    }

    #[test]
    fn text_length_and_pattern() {
        let mut answers = valid_answers();
        answers["full_name"] = json!("A");
        let errors = race_schema().validate_answers(&answers).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "too_short");
    }

    #[test]
    fn non_object_answers_rejected() {
        let errors = race_schema().validate_answers(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(errors.field_errors()["answers"][0].code, "answers_not_an_object");
    }

    #[test]
    fn empty_optional_fields_are_ignored() {
        let mut answers = valid_answers();
        answers["phone"] = json!("");
        answers["dietary"] = json!([]);
        assert!(race_schema().validate_answers(&answers).is_ok());
    }

    #[test]
    fn phone_validation() {
        let mut answers = valid_answers();
        answers["phone"] = json!("+91 98765 43210");
        assert!(race_schema().validate_answers(&answers).is_ok());
        answers["phone"] = json!("call me");
        assert!(race_schema().validate_answers(&answers).is_err());
    }
}
