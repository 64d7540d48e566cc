use crate::components::fields::TextField;
use crate::components::session::{AuthEvent, use_auth};
use crate::components::ui::*;
use crate::error::SubmitError;
use crate::validation::{Field, FieldErrors, FormKind, FormState, validate};

use leptos::ev::SubmitEvent;
use leptos::prelude::*;

#[cfg(feature = "ssr")]
mod ssr {
    pub use crate::ssr::app_state::*;
    pub use crate::ssr::backend::*;
    pub use crate::ssr::cookie::*;
}

/// Check credentials and start a session.
#[server]
async fn sign_in(email: String, password: String) -> Result<(), ServerFnError> {
    use self::ssr::*;

    let form = FormState {
        email,
        password,
        ..Default::default()
    };
    check_form(&form, FormKind::SignIn).map_err(BackendError::into_server_error)?;

    let app_state = use_app_state()?;
    let account_id = app_state
        .sign_in(&form.email, &form.password)
        .await
        .map_err(BackendError::into_server_error)?;
    app_state
        .create_session(&use_response_options()?, account_id)
        .await
        .map_err(BackendError::into_server_error)?;
    Ok(())
}

#[component]
pub fn SignInForm() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let sign_in = ServerAction::<SignIn>::new();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if sign_in.pending().get_untracked() {
            return;
        }
        let form = FormState {
            email: email.get_untracked(),
            password: password.get_untracked(),
            ..Default::default()
        };
        let found = validate(&form, FormKind::SignIn);
        if !found.is_empty() {
            errors.set(found);
            return;
        }
        sign_in.dispatch(SignIn {
            email: form.email,
            password: form.password,
        });
    };

    Effect::new(move |_| match sign_in.value().get() {
        Some(Ok(())) => {
            toasts.success("Welcome back!", "You have successfully signed in.");
            // The auth wrapper takes us home once the new session is fetched.
            auth.notify(AuthEvent::SignedIn);
        }
        Some(Err(err)) => {
            let message = SubmitError::from(err).report("Sign in");
            toasts.error("Error", message);
        }
        None => {}
    });

    view! {
        <form class="flex flex-col gap-4" on:submit=on_submit novalidate>
            <TextField
                field=Field::Email
                label="Email"
                value=email
                errors=errors
                input_type="email"
                placeholder="you@example.com"
                autocomplete="email"
            />
            <TextField
                field=Field::Password
                label="Password"
                value=password
                errors=errors
                input_type="password"
                autocomplete="current-password"
            />
            <div class="text-sm text-right">
                <ANorm href="/auth/forgot">"Forgot password?"</ANorm>
            </div>
            <SubmitButton pending=sign_in.pending() label="Sign in" busy_label="Signing in..." />
        </form>
    }
}
