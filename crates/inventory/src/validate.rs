//! Field validation helpers shared by the input types.

use shelfwise_core::FieldError;

pub(crate) fn text(errors: &mut Vec<FieldError>, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

pub(crate) fn positive_int(errors: &mut Vec<FieldError>, field: &'static str, value: i64, message: &str) {
    if value <= 0 {
        errors.push(FieldError::new(field, message));
    }
}

pub(crate) fn non_negative_int(errors: &mut Vec<FieldError>, field: &'static str, value: i64, message: &str) {
    if value < 0 {
        errors.push(FieldError::new(field, message));
    }
}

pub(crate) fn positive(errors: &mut Vec<FieldError>, field: &'static str, value: f64, message: &str) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(FieldError::new(field, message));
    }
}

pub(crate) fn non_negative(errors: &mut Vec<FieldError>, field: &'static str, value: f64, message: &str) {
    if !value.is_finite() || value < 0.0 {
        errors.push(FieldError::new(field, message));
    }
}

/// Apply `check` only when the optional field is present.
pub(crate) fn opt<T: Copy>(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<T>,
    message: &str,
    check: fn(&mut Vec<FieldError>, &'static str, T, &str),
) {
    if let Some(v) = value {
        check(errors, field, v, message);
    }
}

pub(crate) fn opt_text(errors: &mut Vec<FieldError>, field: &'static str, value: Option<&str>, message: &str) {
    if let Some(v) = value {
        text(errors, field, v, message);
    }
}
