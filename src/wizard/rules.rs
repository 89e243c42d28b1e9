//! Per-field validation rules.
//!
//! A rule is a predicate paired with the message reported when it fails.
//! A field's rules run in declaration order and the first failing rule
//! decides the message.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::state::{FieldValue, FormValues};

/// Loose address check: something, an `@`, a domain with at least one dot
pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Five-digit U.S. zip code
pub static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").expect("valid zip regex"));

/// Date format accepted for date fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The predicate half of a rule
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Value must be present and not blank
    Required,
    /// Text must match the whole pattern
    Pattern(&'static Lazy<Regex>),
    /// Character count bounds, both inclusive
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Text must be one of the listed options
    OneOf(&'static [&'static str]),
    /// Text must parse as a calendar date in `DATE_FORMAT`
    Date,
    /// Checkbox must be ticked
    Checked,
}

impl Check {
    /// Whether a blank value passes without evaluation.
    ///
    /// Only `Required` and `Checked` look at blank values; every other check
    /// constrains a value once one is given.
    fn skips_blank(&self) -> bool {
        !matches!(self, Check::Required | Check::Checked)
    }

    pub fn passes(&self, value: &FieldValue) -> bool {
        if value.is_blank() && self.skips_blank() {
            return true;
        }
        match self {
            Check::Required => !value.is_blank(),
            Check::Checked => value.is_checked(),
            Check::Pattern(re) => value.as_text().is_some_and(|s| re.is_match(s)),
            Check::Length { min, max } => value.as_text().is_some_and(|s| {
                let len = s.chars().count();
                min.map_or(true, |m| len >= m) && max.map_or(true, |m| len <= m)
            }),
            Check::OneOf(options) => value.as_text().is_some_and(|s| options.contains(&s)),
            Check::Date => value
                .as_text()
                .is_some_and(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).is_ok()),
        }
    }
}

/// A check and its failure message
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub check: Check,
    pub message: &'static str,
}

impl Rule {
    pub const fn new(check: Check, message: &'static str) -> Self {
        Self { check, message }
    }
}

/// Run a field's rules in order, returning the first failure message
pub fn first_failure(rules: &[Rule], value: &FieldValue) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| !rule.check.passes(value))
        .map(|rule| rule.message)
}

/// A rule over two fields whose failure is reported on `field`
#[derive(Debug, Clone, Copy)]
pub struct CrossFieldRule {
    /// The dependent field that receives the message
    pub field: &'static str,
    /// The field it must equal
    pub equals: &'static str,
    pub message: &'static str,
}

impl CrossFieldRule {
    /// Missing, `null` and blank text all count as the same blank value
    pub fn passes(&self, values: &FormValues) -> bool {
        let present = |name: &str| values.get(name).filter(|v| !v.is_blank());
        present(self.field) == present(self.equals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::from(s)
    }

    #[test]
    fn test_required() {
        assert!(!Check::Required.passes(&FieldValue::Empty));
        assert!(!Check::Required.passes(&text("  ")));
        assert!(Check::Required.passes(&text("Jo")));
    }

    #[test]
    fn test_email_pattern() {
        let check = Check::Pattern(&EMAIL_RE);
        assert!(check.passes(&text("a@b.com")));
        assert!(!check.passes(&text("a@b")));
        assert!(!check.passes(&text("not an email")));
    }

    #[test]
    fn test_zip_pattern() {
        let check = Check::Pattern(&ZIP_RE);
        assert!(check.passes(&text("12345")));
        assert!(!check.passes(&text("1234")));
        assert!(!check.passes(&text("123456")));
        assert!(!check.passes(&text("1234a")));
    }

    #[test]
    fn test_non_required_checks_skip_blank() {
        assert!(Check::Pattern(&ZIP_RE).passes(&FieldValue::Empty));
        assert!(Check::Date.passes(&text("")));
        assert!(Check::OneOf(&["A"]).passes(&FieldValue::Empty));
    }

    #[test]
    fn test_length_counts_chars() {
        let check = Check::Length {
            min: Some(2),
            max: Some(3),
        };
        assert!(!check.passes(&text("a")));
        assert!(check.passes(&text("ab")));
        assert!(check.passes(&text("äöü")));
        assert!(!check.passes(&text("abcd")));
    }

    #[test]
    fn test_date() {
        assert!(Check::Date.passes(&text("2000-01-01")));
        assert!(!Check::Date.passes(&text("2000-02-30")));
        assert!(!Check::Date.passes(&text("01/01/2000")));
    }

    #[test]
    fn test_checked() {
        assert!(!Check::Checked.passes(&FieldValue::Empty));
        assert!(!Check::Checked.passes(&FieldValue::Flag(false)));
        assert!(Check::Checked.passes(&FieldValue::Flag(true)));
    }

    #[test]
    fn test_first_failure_wins() {
        let rules = [
            Rule::new(Check::Required, "Zip Code is required"),
            Rule::new(Check::Pattern(&ZIP_RE), "Invalid Zip Code"),
        ];
        assert_eq!(
            first_failure(&rules, &FieldValue::Empty),
            Some("Zip Code is required")
        );
        assert_eq!(first_failure(&rules, &text("1234")), Some("Invalid Zip Code"));
        assert_eq!(first_failure(&rules, &text("12345")), None);
    }

    #[test]
    fn test_cross_field_equality() {
        let rule = CrossFieldRule {
            field: "confirm",
            equals: "password",
            message: "Passwords do not match",
        };
        let mut values = FormValues::new();
        values.insert("password".into(), text("Abcd1234"));
        values.insert("confirm".into(), text("Abcd1235"));
        assert!(!rule.passes(&values));

        values.insert("confirm".into(), text("Abcd1234"));
        assert!(rule.passes(&values));
    }

    #[test]
    fn test_cross_field_blank_values_are_equal() {
        let rule = CrossFieldRule {
            field: "confirm",
            equals: "password",
            message: "Passwords do not match",
        };
        let mut values = FormValues::new();
        values.insert("password".into(), text(""));
        assert!(rule.passes(&values));

        values.insert("confirm".into(), FieldValue::Empty);
        assert!(rule.passes(&values));

        values.insert("confirm".into(), text("  "));
        assert!(rule.passes(&values));

        values.insert("confirm".into(), text("Abcd1234"));
        assert!(!rule.passes(&values));
    }
}
