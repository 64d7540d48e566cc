//! Onboarding flows driven through the form rules and the route gate, the way the screens use them.

use mathmentor::gate::{GateInput, GatePolicy, GateState, ProfileLoad, decide};
use mathmentor::model::{Grade, Institution, Membership, Profile, Role, Session};
use mathmentor::strength::strength;
use mathmentor::validation::{Field, FormKind, FormState, validate};

fn gate(session: Option<&Session>, profile: ProfileLoad, policy: GatePolicy) -> GateState {
    decide(
        &GateInput {
            session_loading: false,
            session,
            profile: &profile,
        },
        policy,
    )
}

fn profile_from(form: &FormState, completed: bool) -> Profile {
    let details = form.profile_details().expect("form should be valid");
    let (grade, institution) = details.membership.columns();
    Profile {
        id: "acc1".into(),
        name: details.name,
        role: details.membership.role(),
        grade,
        institution,
        profile_completed: completed,
    }
}

#[test]
fn student_signs_up_and_reaches_home() {
    let mut form = FormState {
        email: "aisyah@example.com".into(),
        password: "weak".into(),
        name: "Aisyah".into(),
        role: Role::Student,
        ..Default::default()
    };

    let errors = validate(&form, FormKind::SignUp);
    assert_eq!(
        errors.get(Field::Password),
        Some("Password must be at least 8 characters")
    );
    assert_eq!(errors.get(Field::Grade), Some("Grade is required for students"));
    assert!(!errors.contains(Field::Institution));

    form.password = "Maths2025".into();
    form.grade = Some(Grade::G3.code().into());
    assert!(validate(&form, FormKind::SignUp).is_empty());
    assert!(strength(&form.password) >= 75);

    let session = Session::new("acc1");
    let profile = profile_from(&form, true);
    assert_eq!(
        profile.membership(),
        Some(Membership::Student { grade: Grade::G3 })
    );
    assert_eq!(
        gate(Some(&session), ProfileLoad::Loaded(Some(profile)), GatePolicy::PROTECTED),
        GateState::AuthenticatedComplete
    );
}

#[test]
fn unfinished_profile_is_sent_to_setup_then_home() {
    let session = Session::new("acc2");
    let state = gate(Some(&session), ProfileLoad::Loaded(None), GatePolicy::PROTECTED);
    assert_eq!(state.redirect(), Some("/profile-setup"));

    // The setup screen itself lets the user in.
    assert_eq!(
        gate(Some(&session), ProfileLoad::Loaded(None), GatePolicy::SIGNED_IN),
        GateState::AuthenticatedComplete
    );

    let form = FormState {
        name: "  Encik Rahman ".into(),
        role: Role::Mentor,
        institution: Some(Institution::TadikaUniversitiMalaysiaSabah.name().into()),
        ..Default::default()
    };
    assert!(validate(&form, FormKind::ProfileCompletion).is_empty());

    let profile = profile_from(&form, true);
    assert_eq!(profile.name, "Encik Rahman");
    assert_eq!(
        gate(
            Some(&session),
            ProfileLoad::Loaded(Some(profile.clone())),
            GatePolicy::with_role(Role::Mentor)
        ),
        GateState::AuthenticatedComplete
    );
    assert_eq!(
        gate(
            Some(&session),
            ProfileLoad::Loaded(Some(profile)),
            GatePolicy::with_role(Role::Student)
        )
        .redirect(),
        Some("/unauthorized")
    );
}

#[test]
fn signed_out_visitor_goes_to_sign_in() {
    for policy in [
        GatePolicy::PROTECTED,
        GatePolicy::SIGNED_IN,
        GatePolicy::with_role(Role::Mentor),
    ] {
        assert_eq!(
            gate(None, ProfileLoad::Loaded(None), policy).redirect(),
            Some("/auth")
        );
    }
}

#[test]
fn sign_in_form_rejects_bad_input_before_sending() {
    let form = FormState {
        email: "not an email".into(),
        password: String::new(),
        ..Default::default()
    };
    let errors = validate(&form, FormKind::SignIn);
    assert_eq!(errors.get(Field::Email), Some("Invalid email format"));
    assert_eq!(errors.get(Field::Password), Some("Password is required"));
    assert!(!errors.contains(Field::Name));
}

#[test]
fn password_reset_forms_check_only_their_field() {
    let forgot = FormState {
        email: "siti@example.com".into(),
        ..Default::default()
    };
    assert!(validate(&forgot, FormKind::ForgotPassword).is_empty());

    let reset = FormState {
        password: "lowercase1".into(),
        ..Default::default()
    };
    let errors = validate(&reset, FormKind::ResetPassword);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.get(Field::Password),
        Some("Password must contain at least one uppercase letter")
    );
}
