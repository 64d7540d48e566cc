//! Field rules for the auth and profile forms.
//!
//! The same rules run in the browser before anything is submitted and again in the server
//! functions, so a request that skipped the form is rejected with the same message.
use crate::model::{Grade, Institution, Membership, ProfileDetails, Role};
use crate::strength::strength;

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const NAME_MIN_LEN: usize = 2;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern should compile"));

/// Which form is being checked. Decides the fields that apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    SignIn,
    SignUp,
    ProfileCompletion,
    ForgotPassword,
    ResetPassword,
}

impl FormKind {
    fn checks_email(self) -> bool {
        matches!(
            self,
            FormKind::SignIn | FormKind::SignUp | FormKind::ForgotPassword
        )
    }

    fn checks_password(self) -> bool {
        matches!(
            self,
            FormKind::SignIn | FormKind::SignUp | FormKind::ResetPassword
        )
    }

    /// Name, grade and institution.
    fn checks_profile(self) -> bool {
        matches!(self, FormKind::SignUp | FormKind::ProfileCompletion)
    }
}

/// How demanding the password rules are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordPolicy {
    /// At least 8 characters with an uppercase letter and a digit.
    #[default]
    Standard,
    /// Standard, plus a symbol. Equivalent to a full strength meter.
    Strict,
}

impl PasswordPolicy {
    /// Policy used by every form in the application.
    pub const CANONICAL: PasswordPolicy = PasswordPolicy::Standard;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    Password,
    Name,
    Grade,
    Institution,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Password => "password",
            Field::Name => "name",
            Field::Grade => "grade",
            Field::Institution => "institution",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of an open form. Grade and institution stay raw until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub grade: Option<String>,
    pub institution: Option<String>,
}

impl FormState {
    /// The role-specific data, if the field the role needs holds a known value.
    pub fn membership(&self) -> Option<Membership> {
        match self.role {
            Role::Student => parse_selection::<Grade>(&self.grade)
                .map(|grade| Membership::Student { grade }),
            Role::Mentor => parse_selection::<Institution>(&self.institution)
                .map(|institution| Membership::Mentor { institution }),
        }
    }

    /// Name and membership, once the profile fields pass validation.
    pub fn profile_details(&self) -> Option<ProfileDetails> {
        Some(ProfileDetails {
            name: self.name.trim().to_string(),
            membership: self.membership()?,
        })
    }
}

fn parse_selection<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|value| value.parse().ok())
}

/// Error messages by field. Only fields that currently break a rule are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Drop the error for a field the user just edited.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// The message reported when a server function rejects a form.
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    fn record(&mut self, field: Field, error: Option<&'static str>) {
        if let Some(message) = error {
            self.0.insert(field, message.to_string());
        }
    }
}

/// Validate with the application's password policy.
pub fn validate(form: &FormState, kind: FormKind) -> FieldErrors {
    validate_with(form, kind, PasswordPolicy::CANONICAL)
}

pub fn validate_with(form: &FormState, kind: FormKind, policy: PasswordPolicy) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if kind.checks_email() {
        errors.record(Field::Email, email_error(&form.email));
    }
    if kind.checks_password() {
        errors.record(Field::Password, password_error(&form.password, policy));
    }
    if kind.checks_profile() {
        errors.record(Field::Name, name_error(&form.name));
        match form.role {
            Role::Student => errors.record(Field::Grade, grade_error(&form.grade)),
            Role::Mentor => errors.record(Field::Institution, institution_error(&form.institution)),
        }
    }

    errors
}

pub fn email_error(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        Some("Email is required")
    } else if !EMAIL_SHAPE.is_match(email) {
        Some("Invalid email format")
    } else {
        None
    }
}

pub fn password_error(password: &str, policy: PasswordPolicy) -> Option<&'static str> {
    if password.is_empty() {
        Some("Password is required")
    } else if password.chars().count() < PASSWORD_MIN_LEN {
        Some("Password must be at least 8 characters")
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Some("Password must contain at least one uppercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain at least one number")
    } else if policy == PasswordPolicy::Strict && strength(password) < 100 {
        Some("Password must contain at least one symbol")
    } else {
        None
    }
}

fn name_error(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        Some("Name is required")
    } else if name.chars().count() < NAME_MIN_LEN {
        Some("Name must be at least 2 characters")
    } else {
        None
    }
}

fn grade_error(grade: &Option<String>) -> Option<&'static str> {
    match grade.as_deref() {
        None | Some("") => Some("Grade is required for students"),
        Some(value) if value.parse::<Grade>().is_err() => Some("Please select a valid grade"),
        Some(_) => None,
    }
}

fn institution_error(institution: &Option<String>) -> Option<&'static str> {
    match institution.as_deref() {
        None | Some("") => Some("Institution is required for mentors"),
        Some(value) if value.parse::<Institution>().is_err() => {
            Some("Please select a valid institution")
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(role: Role) -> FormState {
        FormState {
            email: "siti@example.com".into(),
            password: "Aa123456".into(),
            name: "Siti".into(),
            role,
            grade: None,
            institution: None,
        }
    }

    fn password_message(password: &str) -> Option<String> {
        let form = FormState {
            password: password.into(),
            ..sign_up(Role::Student)
        };
        validate(&form, FormKind::SignIn)
            .get(Field::Password)
            .map(str::to_string)
    }

    #[test]
    fn email_shapes() {
        for bad in [
            "", "plain", "no-at.example.com", "a@b", "a@b.", "@b.com", "a b@c.de", "a@b.c ",
        ] {
            assert!(email_error(bad).is_some(), "{bad:?} should be rejected");
        }
        for good in ["a@b.co", "first.last@school.edu.my", "x+tag@sub.example.org"] {
            assert_eq!(email_error(good), None, "{good:?} should pass");
        }
        assert_eq!(email_error(""), Some("Email is required"));
        assert_eq!(email_error("nope"), Some("Invalid email format"));
    }

    #[test]
    fn password_rules_in_order() {
        assert_eq!(password_message("Aa123456"), None);
        assert_eq!(password_message(""), Some("Password is required".into()));
        assert_eq!(
            password_message("short"),
            Some("Password must be at least 8 characters".into())
        );
        assert_eq!(
            password_message("alllowercase1"),
            Some("Password must contain at least one uppercase letter".into())
        );
        assert_eq!(
            password_message("ALLUPPERCASE"),
            Some("Password must contain at least one number".into())
        );
        // Too short wins over the missing uppercase letter and digit.
        assert_eq!(
            password_message("abc"),
            Some("Password must be at least 8 characters".into())
        );
    }

    #[test]
    fn strict_policy_requires_a_symbol() {
        assert_eq!(
            password_error("Aa123456", PasswordPolicy::Strict),
            Some("Password must contain at least one symbol")
        );
        assert_eq!(password_error("Aa12345!", PasswordPolicy::Strict), None);
        assert_eq!(password_error("Aa123456", PasswordPolicy::Standard), None);
    }

    #[test]
    fn all_violations_reported_together() {
        let form = FormState {
            email: "bad".into(),
            password: "bad".into(),
            name: "".into(),
            role: Role::Mentor,
            grade: None,
            institution: None,
        };
        let errors = validate(&form, FormKind::SignUp);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(Field::Email), Some("Invalid email format"));
        assert_eq!(errors.get(Field::Password), Some("Password must be at least 8 characters"));
        assert_eq!(errors.get(Field::Name), Some("Name is required"));
        assert_eq!(errors.get(Field::Institution), Some("Institution is required for mentors"));
        assert_eq!(errors.first_message(), Some("Invalid email format"));
    }

    #[test]
    fn student_needs_grade_not_institution() {
        let errors = validate(&sign_up(Role::Student), FormKind::SignUp);
        assert_eq!(errors.get(Field::Grade), Some("Grade is required for students"));
        assert!(!errors.contains(Field::Institution));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn mentor_needs_institution_not_grade() {
        let errors = validate(&sign_up(Role::Mentor), FormKind::SignUp);
        assert_eq!(errors.get(Field::Institution), Some("Institution is required for mentors"));
        assert!(!errors.contains(Field::Grade));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn stale_field_of_other_role_is_ignored() {
        let form = FormState {
            role: Role::Mentor,
            grade: Some("not a grade".into()),
            institution: Some("Others".into()),
            ..sign_up(Role::Mentor)
        };
        assert!(validate(&form, FormKind::SignUp).is_empty());
    }

    #[test]
    fn selections_must_come_from_fixed_sets() {
        let student = FormState {
            grade: Some("G9".into()),
            ..sign_up(Role::Student)
        };
        assert_eq!(
            validate(&student, FormKind::ProfileCompletion).get(Field::Grade),
            Some("Please select a valid grade")
        );

        let mentor = FormState {
            institution: Some("Hogwarts".into()),
            ..sign_up(Role::Mentor)
        };
        assert_eq!(
            validate(&mentor, FormKind::ProfileCompletion).get(Field::Institution),
            Some("Please select a valid institution")
        );
    }

    #[test]
    fn empty_selection_counts_as_missing() {
        let form = FormState {
            grade: Some(String::new()),
            ..sign_up(Role::Student)
        };
        assert_eq!(
            validate(&form, FormKind::SignUp).get(Field::Grade),
            Some("Grade is required for students")
        );
    }

    #[test]
    fn name_rules() {
        let short = FormState {
            name: " A ".into(),
            ..sign_up(Role::Student)
        };
        assert_eq!(
            validate(&short, FormKind::ProfileCompletion).get(Field::Name),
            Some("Name must be at least 2 characters")
        );
        let blank = FormState {
            name: "   ".into(),
            ..sign_up(Role::Student)
        };
        assert_eq!(
            validate(&blank, FormKind::ProfileCompletion).get(Field::Name),
            Some("Name is required")
        );
    }

    #[test]
    fn form_kind_limits_checked_fields() {
        let empty = FormState::default();

        let sign_in = validate(&empty, FormKind::SignIn);
        assert!(sign_in.contains(Field::Email) && sign_in.contains(Field::Password));
        assert_eq!(sign_in.len(), 2);

        let forgot = validate(&empty, FormKind::ForgotPassword);
        assert_eq!(
            forgot.iter().map(|(field, _)| field).collect::<Vec<_>>(),
            vec![Field::Email]
        );

        let reset = validate(&empty, FormKind::ResetPassword);
        assert_eq!(
            reset.iter().map(|(field, _)| field).collect::<Vec<_>>(),
            vec![Field::Password]
        );

        let profile = validate(&empty, FormKind::ProfileCompletion);
        assert_eq!(
            profile.iter().map(|(field, _)| field).collect::<Vec<_>>(),
            vec![Field::Name, Field::Grade]
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let form = FormState {
            email: "x@".into(),
            ..sign_up(Role::Mentor)
        };
        assert_eq!(validate(&form, FormKind::SignUp), validate(&form, FormKind::SignUp));
    }

    #[test]
    fn clearing_an_edited_field() {
        let mut errors = validate(&FormState::default(), FormKind::SignIn);
        errors.clear(Field::Email);
        assert!(!errors.contains(Field::Email));
        assert!(errors.contains(Field::Password));
    }

    #[test]
    fn profile_details_from_valid_form() {
        let form = FormState {
            name: "  Mei Ling ".into(),
            grade: Some("G4".into()),
            ..sign_up(Role::Student)
        };
        assert_eq!(
            form.profile_details(),
            Some(ProfileDetails {
                name: "Mei Ling".into(),
                membership: Membership::Student { grade: Grade::G4 },
            })
        );
        assert_eq!(sign_up(Role::Mentor).profile_details(), None);
    }
}
