//! Field validation run before any record is written.
//!
//! Every record implements [`Validate`]. Validation collects all field
//! problems instead of stopping at the first one, so callers get the full
//! picture in one error.
//!
//! ```rust
//! use dejavue::libs::validation::{ValidationErrors, Validator};
//!
//! let mut v = Validator::new();
//! v.required("title", "");
//! v.range("probability", 140, 1, 100);
//! let err: ValidationErrors = v.finish().unwrap_err();
//! assert_eq!(err.fields(), vec!["title", "probability"]);
//! ```

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use url::{Host, Url};

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$";

static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn email_pattern() -> Option<&'static Regex> {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// A single problem with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field problems found on one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the offending fields, in the order they were reported.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Implemented by every persisted record. Called by repositories on save.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Accumulates field errors.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Text must contain something other than whitespace.
    pub fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "This field cannot be blank.");
        }
    }

    /// Text must not exceed `max` characters.
    pub fn max_length(&mut self, field: &'static str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.add(field, format!("Ensure this value has at most {} characters (it has {}).", max, len));
        }
    }

    /// Shorthand for a required text field with a length limit.
    pub fn text(&mut self, field: &'static str, value: &str, max: usize) {
        self.required(field, value);
        self.max_length(field, value, max);
    }

    /// Inclusive integer range.
    pub fn range(&mut self, field: &'static str, value: i64, min: i64, max: i64) {
        if value < min {
            self.add(field, format!("Ensure this value is greater than or equal to {}.", min));
        } else if value > max {
            self.add(field, format!("Ensure this value is less than or equal to {}.", max));
        }
    }

    /// Floats must be finite; NaN and infinities cannot be stored faithfully.
    pub fn finite(&mut self, field: &'static str, value: f64) {
        if !value.is_finite() {
            self.add(field, "Enter a finite number.");
        }
    }

    /// Decimal with `max_digits` total digits and `decimal_places` fractional digits.
    pub fn decimal(&mut self, field: &'static str, value: f64, max_digits: u32, decimal_places: u32) {
        if !value.is_finite() {
            self.add(field, "Enter a number.");
            return;
        }
        let whole_digits = max_digits - decimal_places;
        if value.abs() >= 10f64.powi(whole_digits as i32) {
            self.add(
                field,
                format!("Ensure that there are no more than {} digits before the decimal point.", whole_digits),
            );
        }
    }

    /// `start` must not come after `end` when `end` is present.
    pub fn date_order(&mut self, field: &'static str, start: NaiveDate, end: Option<NaiveDate>) {
        if let Some(end) = end {
            if start > end {
                self.add(field, "Start date must be before end date.");
            }
        }
    }

    /// Blank, or an absolute http(s) URL with a host.
    pub fn url(&mut self, field: &'static str, value: &str) {
        if value.is_empty() {
            return;
        }
        let valid = match Url::parse(value) {
            Ok(_) if value.chars().any(char::is_whitespace) => false,
            Ok(parsed) => {
                matches!(parsed.scheme(), "http" | "https")
                    && match parsed.host() {
                        Some(Host::Domain(domain)) => domain.split('.').all(|label| !label.is_empty()),
                        Some(_) => true,
                        None => false,
                    }
            }
            Err(_) => false,
        };
        if !valid {
            self.add(field, "Enter a valid URL.");
        }
    }

    /// One local part, one `@`, and a dotted domain with no empty labels.
    pub fn email(&mut self, field: &'static str, value: &str) {
        let valid = email_pattern().is_some_and(|pattern| pattern.is_match(value));
        if !valid {
            self.add(field, "Enter a valid email address.");
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors: self.errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_problem() {
        let mut v = Validator::new();
        v.text("name", "", 10);
        v.max_length("title", "abcdef", 3);
        v.range("rating", 0, 1, 10);
        let err = v.finish().unwrap_err();
        assert_eq!(err.fields(), vec!["name", "title", "rating"]);
    }

    #[test]
    fn range_boundaries_are_inclusive() {
        let mut v = Validator::new();
        v.range("probability", 1, 1, 100);
        v.range("probability", 100, 1, 100);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.range("probability", 101, 1, 100);
        assert!(v.finish().unwrap_err().has_field("probability"));
    }

    #[test]
    fn date_order_ignores_missing_end() {
        let start = NaiveDate::from_ymd_opt(1914, 7, 28).unwrap();
        let mut v = Validator::new();
        v.date_order("end_date", start, None);
        v.date_order("end_date", start, Some(start));
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.date_order("end_date", start, NaiveDate::from_ymd_opt(1914, 1, 1));
        assert!(v.finish().is_err());
    }

    #[test]
    fn url_accepts_blank_and_http() {
        let mut v = Validator::new();
        v.url("url", "");
        v.url("url", "https://en.wikipedia.org/wiki/Renaissance");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.url("url", "ftp://example.com");
        v.url("url", "https://");
        assert_eq!(v.finish().unwrap_err().errors().len(), 2);
    }

    #[test]
    fn url_rejects_malformed_hosts_and_ports() {
        for value in [
            "http://:::",
            "http://@",
            "https://..",
            "http://exa<>mple.com",
            "http://a:notaport/",
            "https://example.com/two words",
        ] {
            let mut v = Validator::new();
            v.url("url", value);
            assert!(v.finish().is_err(), "{} should be rejected", value);
        }

        let mut v = Validator::new();
        v.url("url", "http://127.0.0.1:8080/archive?page=2");
        v.url("url", "https://[::1]/");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn decimal_rejects_too_many_whole_digits() {
        let mut v = Validator::new();
        v.decimal("latitude", 123.456789, 9, 6);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.decimal("latitude", 1000.0, 9, 6);
        assert!(v.finish().is_err());
    }

    #[test]
    fn email_shape() {
        let mut v = Validator::new();
        v.email("email", "ada@example.org");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.email("email", "ada.example.org");
        assert!(v.finish().is_err());
    }

    #[test]
    fn email_rejects_extra_at_and_empty_labels() {
        for value in ["a@b@c.com", "a@b..c", "a@.b.c", "a@b.c.", "@b.c", "a b@c.com", "a@localhost"] {
            let mut v = Validator::new();
            v.email("email", value);
            assert!(v.finish().is_err(), "{} should be rejected", value);
        }

        let mut v = Validator::new();
        v.email("email", "first.last+tag@mail.example.co.uk");
        assert!(v.finish().is_ok());
    }
}
