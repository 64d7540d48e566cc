//! Choosing a new password, from a mailed link or from a signed-in session.
use crate::components::fields::TextField;
use crate::components::session::{AuthEvent, replace, use_auth};
use crate::components::ui::*;
use crate::error::SubmitError;
use crate::validation::{Field, FieldErrors, FormKind, FormState, validate};

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_query_map;

#[cfg(feature = "ssr")]
mod ssr {
    pub use crate::ssr::app_state::*;
    pub use crate::ssr::backend::*;
    pub use crate::ssr::cookie::*;
    pub use actix_web::HttpRequest;
    pub use leptos_actix::extract;
}

/// Set a new password for the account named by `token`, or for the signed-in account when there
/// is no token. Either way the visitor ends up signed in.
#[server]
async fn update_password(token: Option<String>, password: String) -> Result<(), ServerFnError> {
    use self::ssr::*;

    let form = FormState {
        password,
        ..Default::default()
    };
    check_form(&form, FormKind::ResetPassword).map_err(BackendError::into_server_error)?;

    let app_state = use_app_state()?;
    match token.filter(|token| !token.is_empty()) {
        Some(token) => {
            let account_id = app_state
                .reset_password(&token, &form.password)
                .await
                .map_err(BackendError::into_server_error)?;
            app_state
                .create_session(&use_response_options()?, account_id)
                .await
                .map_err(BackendError::into_server_error)?;
        }
        None => {
            let request: HttpRequest = extract().await?;
            let session = app_state
                .require_session(&request)
                .await
                .map_err(BackendError::into_server_error)?;
            app_state
                .update_password(session.account_id, &form.password)
                .await
                .map_err(BackendError::into_server_error)?;
        }
    }
    Ok(())
}

#[component]
pub fn ResetPassword() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let query = use_query_map();
    let token = move || query.read().get("token");
    let update_password = ServerAction::<UpdatePassword>::new();
    let updated = RwSignal::new(false);

    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if update_password.pending().get_untracked() {
            return;
        }
        let form = FormState {
            password: password.get_untracked(),
            ..Default::default()
        };
        let found = validate(&form, FormKind::ResetPassword);
        if !found.is_empty() {
            errors.set(found);
            return;
        }
        update_password.dispatch(UpdatePassword {
            token: query.with_untracked(|query| query.get("token")),
            password: form.password,
        });
    };

    Effect::new(move |_| match update_password.value().get() {
        Some(Ok(())) => {
            toasts.success("Password updated!", "Your password has been changed.");
            updated.set(true);
            auth.notify(AuthEvent::PasswordUpdated);
        }
        Some(Err(err)) => {
            let message = SubmitError::from(err).report("Password update");
            toasts.error("Error", message);
        }
        None => {}
    });

    // Without a token there is nobody to reset the password for unless someone is signed in.
    let can_reset = move || token().is_some() || auth.is_signed_in();

    view! {
        <div class="p-6 mx-auto mt-8 max-w-md bg-white rounded shadow">
            <h1 class="mb-2 text-2xl font-bold">"Choose a new password"</h1>
            <Transition fallback=|| view! { <Loading /> }>
                <Show when=move || updated.get() && auth.is_signed_in()>
                    <Redirect path="/" options=replace() />
                </Show>
                <Show
                    when=can_reset
                    fallback=|| {
                        view! {
                            <p class="mb-4">
                                "This page needs the link from your password reset email. "
                                "You can ask for a new one, or sign in to change your password."
                            </p>
                            <div class="flex gap-4">
                                <ANorm href="/auth/forgot">"Send a new link"</ANorm>
                                <ANorm href="/auth">"Sign in"</ANorm>
                            </div>
                        }
                    }
                >
                    <form class="flex flex-col gap-4" on:submit=on_submit novalidate>
                        <div>
                            <TextField
                                field=Field::Password
                                label="New password"
                                value=password
                                errors=errors
                                input_type="password"
                                autocomplete="new-password"
                            />
                            <StrengthMeter password=password />
                        </div>
                        <SubmitButton
                            pending=update_password.pending()
                            label="Update password"
                            busy_label="Updating..."
                        />
                    </form>
                </Show>
            </Transition>
        </div>
    }
}
