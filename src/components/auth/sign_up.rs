use crate::components::fields::{MembershipFields, RoleSelector, TextField};
use crate::components::session::{AuthEvent, use_auth};
use crate::components::ui::*;
use crate::error::SubmitError;
use crate::model::Role;
use crate::validation::{Field, FieldErrors, FormKind, FormState, validate};

use leptos::ev::SubmitEvent;
use leptos::prelude::*;

#[cfg(feature = "ssr")]
mod ssr {
    pub use crate::ssr::app_state::*;
    pub use crate::ssr::backend::*;
    pub use crate::ssr::cookie::*;
}

/// Create an account with a finished profile, and sign it in.
#[server]
async fn sign_up(
    email: String,
    password: String,
    name: String,
    role: Role,
    grade: Option<String>,
    institution: Option<String>,
) -> Result<(), ServerFnError> {
    use self::ssr::*;

    let form = FormState {
        email,
        password,
        name,
        role,
        grade,
        institution,
    };
    check_form(&form, FormKind::SignUp).map_err(BackendError::into_server_error)?;
    let details = form.profile_details().ok_or_else(|| {
        BackendError::Rejected("Please complete your profile".to_string()).into_server_error()
    })?;

    let app_state = use_app_state()?;
    let account_id = app_state
        .sign_up(&form.email, &form.password, &details)
        .await
        .map_err(BackendError::into_server_error)?;
    app_state
        .create_session(&use_response_options()?, account_id)
        .await
        .map_err(BackendError::into_server_error)?;
    Ok(())
}

#[component]
pub fn SignUpForm() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let sign_up = ServerAction::<SignUp>::new();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());
    let role = RwSignal::new(Role::default());
    let grade = RwSignal::new(None::<String>);
    let institution = RwSignal::new(None::<String>);
    let errors = RwSignal::new(FieldErrors::default());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if sign_up.pending().get_untracked() {
            return;
        }
        let form = FormState {
            email: email.get_untracked(),
            password: password.get_untracked(),
            name: name.get_untracked(),
            role: role.get_untracked(),
            grade: grade.get_untracked(),
            institution: institution.get_untracked(),
        };
        let found = validate(&form, FormKind::SignUp);
        if !found.is_empty() {
            errors.set(found);
            return;
        }
        // Only send the field the role uses.
        let (grade, institution) = match form.role {
            Role::Student => (form.grade, None),
            Role::Mentor => (None, form.institution),
        };
        sign_up.dispatch(SignUp {
            email: form.email,
            password: form.password,
            name: form.name,
            role: form.role,
            grade,
            institution,
        });
    };

    Effect::new(move |_| match sign_up.value().get() {
        Some(Ok(())) => {
            toasts.success("Account created!", "Welcome to Math Mentor.");
            auth.notify(AuthEvent::SignedUp);
        }
        Some(Err(err)) => {
            let message = SubmitError::from(err).report("Sign up");
            toasts.error("Error", message);
        }
        None => {}
    });

    view! {
        <form class="flex flex-col gap-4" on:submit=on_submit novalidate>
            <RoleSelector role=role errors=errors />
            <TextField
                field=Field::Name
                label="Full name"
                value=name
                errors=errors
                autocomplete="name"
            />
            <MembershipFields role=role grade=grade institution=institution errors=errors />
            <TextField
                field=Field::Email
                label="Email"
                value=email
                errors=errors
                input_type="email"
                placeholder="you@example.com"
                autocomplete="email"
            />
            <div>
                <TextField
                    field=Field::Password
                    label="Password"
                    value=password
                    errors=errors
                    input_type="password"
                    autocomplete="new-password"
                />
                <StrengthMeter password=password />
            </div>
            <SubmitButton
                pending=sign_up.pending()
                label="Create account"
                busy_label="Creating account..."
            />
        </form>
    }
}
