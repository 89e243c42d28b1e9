//! Static form schema: fields, steps and the cross-field rule.

use super::rules::{Check, CrossFieldRule, Rule, EMAIL_RE, ZIP_RE};
use super::state::FieldValue;

/// States offered by the address step
pub const US_STATES: &[&str] = &["California", "Texas", "New York", "Florida", "Illinois"];

/// How a field is entered and displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Text rendered masked
    Secret,
    /// `YYYY-MM-DD` text
    Date,
    /// One of a fixed list of options
    Select(&'static [&'static str]),
    /// Boolean checkbox
    Checkbox,
}

impl FieldKind {
    /// Whether a value has the right shape for this kind. `Empty` always fits.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (_, FieldValue::Empty) => true,
            (FieldKind::Checkbox, FieldValue::Flag(_)) => true,
            (FieldKind::Checkbox, FieldValue::Text(_)) => false,
            (_, FieldValue::Text(_)) => true,
            (_, FieldValue::Flag(_)) => false,
        }
    }

    /// Wire type this kind expects, for error messages
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Checkbox => "a boolean",
            _ => "a string",
        }
    }
}

/// A declared form field and its rule set
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire name, also the key in `FormState::values`
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: &'static [Rule],
    pub placeholder: Option<&'static str>,
}

impl FieldSpec {
    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r.check, Check::Required | Check::Checked))
    }
}

/// Fields gated by one wizard step
#[derive(Debug, Clone, Copy)]
pub struct StepSchema {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    /// Cross-field rule evaluated when leaving or submitting this step
    pub cross_field: Option<CrossFieldRule>,
}

impl StepSchema {
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

/// Ordered list of steps making up a form
#[derive(Debug)]
pub struct FormSchema {
    pub steps: &'static [StepSchema],
}

impl FormSchema {
    /// Number of steps, `N`
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Schema for a 1-based step index
    pub fn step(&self, step: usize) -> Option<&StepSchema> {
        step.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// Every declared field, in step order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> + '_ {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().find(|f| f.name == name)
    }

    /// 1-based step that declares a field
    pub fn step_of(&self, name: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.fields.iter().any(|f| f.name == name))
            .map(|i| i + 1)
    }
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    rules: &'static [Rule],
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        rules,
        placeholder: None,
    }
}

static NAME_RULES: [Rule; 2] = [
    Rule::new(Check::Required, "Name is required"),
    Rule::new(
        Check::Length {
            min: None,
            max: Some(100),
        },
        "Name must be at most 100 characters",
    ),
];

static EMAIL_RULES: [Rule; 2] = [
    Rule::new(Check::Required, "Email is required"),
    Rule::new(Check::Pattern(&EMAIL_RE), "Invalid email"),
];

static DOB_RULES: [Rule; 2] = [
    Rule::new(Check::Required, "Date of Birth is required"),
    Rule::new(Check::Date, "Invalid Date of Birth"),
];

static ADDRESS1_RULES: [Rule; 1] = [Rule::new(Check::Required, "Address Line 1 is required")];

static CITY_RULES: [Rule; 1] = [Rule::new(Check::Required, "City is required")];

static STATE_RULES: [Rule; 2] = [
    Rule::new(Check::Required, "State is required"),
    Rule::new(Check::OneOf(US_STATES), "Select a valid state"),
];

static ZIP_RULES: [Rule; 2] = [
    Rule::new(Check::Required, "Zip Code is required"),
    Rule::new(
        Check::Pattern(&ZIP_RE),
        "Invalid Zip Code (only U.S. format is supported)",
    ),
];

static USERNAME_RULES: [Rule; 2] = [
    Rule::new(Check::Required, "Username is required"),
    Rule::new(
        Check::Length {
            min: None,
            max: Some(32),
        },
        "Username must be at most 32 characters",
    ),
];

static PASSWORD_RULES: [Rule; 1] = [Rule::new(Check::Required, "Password is required")];

static CONFIRM_PASSWORD_RULES: [Rule; 1] =
    [Rule::new(Check::Required, "Confirm Password is required")];

static TERMS_RULES: [Rule; 1] = [Rule::new(
    Check::Checked,
    "You must accept the Terms & Conditions",
)];

static PERSONAL_FIELDS: [FieldSpec; 4] = [
    field("name", "Name", FieldKind::Text, &NAME_RULES),
    field("email", "Email", FieldKind::Text, &EMAIL_RULES),
    field("phone", "Phone Number", FieldKind::Text, &[]),
    FieldSpec {
        placeholder: Some("YYYY-MM-DD"),
        ..field("dob", "Date of Birth", FieldKind::Date, &DOB_RULES)
    },
];

static ADDRESS_FIELDS: [FieldSpec; 5] = [
    field("address1", "Address Line 1", FieldKind::Text, &ADDRESS1_RULES),
    field("address2", "Address Line 2", FieldKind::Text, &[]),
    field("city", "City", FieldKind::Text, &CITY_RULES),
    FieldSpec {
        placeholder: Some("Select a state"),
        ..field("state", "State", FieldKind::Select(US_STATES), &STATE_RULES)
    },
    field("zip", "Zip Code", FieldKind::Text, &ZIP_RULES),
];

static ACCOUNT_FIELDS: [FieldSpec; 4] = [
    field("username", "Username", FieldKind::Text, &USERNAME_RULES),
    field("password", "Password", FieldKind::Secret, &PASSWORD_RULES),
    field(
        "confirmPassword",
        "Confirm Password",
        FieldKind::Secret,
        &CONFIRM_PASSWORD_RULES,
    ),
    field(
        "terms",
        "I accept the Terms & Conditions",
        FieldKind::Checkbox,
        &TERMS_RULES,
    ),
];

static SIGNUP_STEPS: [StepSchema; 3] = [
    StepSchema {
        title: "Personal Information",
        fields: &PERSONAL_FIELDS,
        cross_field: None,
    },
    StepSchema {
        title: "Address Information",
        fields: &ADDRESS_FIELDS,
        cross_field: None,
    },
    StepSchema {
        title: "Account Information",
        fields: &ACCOUNT_FIELDS,
        cross_field: Some(CrossFieldRule {
            field: "confirmPassword",
            equals: "password",
            message: "Passwords do not match",
        }),
    },
];

/// The three-step sign-up form
pub static SIGNUP_FORM: FormSchema = FormSchema {
    steps: &SIGNUP_STEPS,
};

/// Fields whose values are never written to logs
pub const SECRET_FIELDS: &[&str] = &["password", "confirmPassword"];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_signup_form_has_three_steps() {
        assert_eq!(SIGNUP_FORM.step_count(), 3);
        assert!(SIGNUP_FORM.step(0).is_none());
        assert!(SIGNUP_FORM.step(4).is_none());
        assert_eq!(
            SIGNUP_FORM.step(1).map(|s| s.title),
            Some("Personal Information")
        );
    }

    #[test]
    fn test_field_names_are_unique() {
        let names: Vec<_> = SIGNUP_FORM.fields().map(|f| f.name).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn test_kind_accepts_matching_values() {
        assert!(FieldKind::Text.accepts(&FieldValue::from("Jo")));
        assert!(FieldKind::Secret.accepts(&FieldValue::Empty));
        assert!(!FieldKind::Text.accepts(&FieldValue::Flag(true)));
        assert!(!FieldKind::Select(US_STATES).accepts(&FieldValue::Flag(false)));
        assert!(FieldKind::Checkbox.accepts(&FieldValue::Flag(false)));
        assert!(!FieldKind::Checkbox.accepts(&FieldValue::from("yes")));
    }

    #[test]
    fn test_step_of() {
        assert_eq!(SIGNUP_FORM.step_of("dob"), Some(1));
        assert_eq!(SIGNUP_FORM.step_of("zip"), Some(2));
        assert_eq!(SIGNUP_FORM.step_of("confirmPassword"), Some(3));
        assert_eq!(SIGNUP_FORM.step_of("nope"), None);
    }

    #[test]
    fn test_optional_fields() {
        assert!(!SIGNUP_FORM.field("phone").unwrap().is_required());
        assert!(!SIGNUP_FORM.field("address2").unwrap().is_required());
        assert!(SIGNUP_FORM.field("terms").unwrap().is_required());
    }

    #[test]
    fn test_cross_field_rule_is_on_final_step() {
        let last = SIGNUP_FORM.step(SIGNUP_FORM.step_count()).unwrap();
        let rule = last.cross_field.unwrap();
        assert_eq!(rule.field, "confirmPassword");
        assert_eq!(rule.equals, "password");
        assert!(last.field_names().any(|f| f == rule.field));
        assert!(last.field_names().any(|f| f == rule.equals));
    }
}
