use crate::components::fields::TextField;
use crate::components::ui::*;
use crate::error::SubmitError;
use crate::model::RESET_LINK_EXPIRATION_MIN;
use crate::validation::{Field, FieldErrors, FormKind, FormState, validate};

use codee::string::FromToStringCodec;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_use::{UseCookieOptions, use_cookie_with_options};

#[cfg(feature = "ssr")]
mod ssr {
    pub use crate::ssr::app_state::*;
    pub use crate::ssr::backend::*;
}

/// Where the last reset link went, so the page can say so after a reload.
const RESET_EMAIL_COOKIE: &str = "rsmail";

/// Mail a password reset link. Succeeds whether or not the address has an account.
#[server]
async fn request_password_reset(email: String) -> Result<(), ServerFnError> {
    use self::ssr::*;

    let form = FormState {
        email,
        ..Default::default()
    };
    check_form(&form, FormKind::ForgotPassword).map_err(BackendError::into_server_error)?;

    let app_state = use_app_state()?;
    app_state
        .request_password_reset(&form.email, &app_state.config.reset_password_url())
        .await
        .map_err(BackendError::into_server_error)?;

    Ok(())
}

#[component]
pub fn ForgotPassword() -> impl IntoView {
    let toasts = use_toasts();
    let request_reset = ServerAction::<RequestPasswordReset>::new();
    let (sent_to, set_sent_to) = use_cookie_with_options::<String, FromToStringCodec>(
        RESET_EMAIL_COOKIE,
        UseCookieOptions::default()
            .path("/")
            .max_age(RESET_LINK_EXPIRATION_MIN * 60 * 1000),
    );

    let email = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if request_reset.pending().get_untracked() {
            return;
        }
        let form = FormState {
            email: email.get_untracked(),
            ..Default::default()
        };
        let found = validate(&form, FormKind::ForgotPassword);
        if !found.is_empty() {
            errors.set(found);
            return;
        }
        request_reset.dispatch(RequestPasswordReset { email: form.email });
    };

    Effect::new(move |_| match request_reset.value().get() {
        Some(Ok(())) => {
            toasts.success("Reset link sent!", "Check your email for the reset link.");
            set_sent_to.set(Some(email.get_untracked()));
        }
        Some(Err(err)) => {
            let message = SubmitError::from(err).report("Password reset request");
            toasts.error("Error", message);
        }
        None => {}
    });

    view! {
        <div class="p-6 bg-white rounded shadow">
            <h2 class="mb-2 text-2xl font-bold">"Reset your password"</h2>
            <Show
                when=move || sent_to.read().is_some()
                fallback=move || {
                    view! {
                        <p class="mb-4 text-slate-600">
                            "Enter your email and we'll send you a link to choose a new password."
                        </p>
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
                            <SubmitButton
                                pending=request_reset.pending()
                                label="Send reset link"
                                busy_label="Sending..."
                            />
                        </form>
                    }
                }
            >
                <p class="mb-4">
                    "If an account exists for " <b>{move || sent_to.get().unwrap_or_default()}</b>
                    ", a reset link is on its way. It works once and expires in "
                    {RESET_LINK_EXPIRATION_MIN} " minutes."
                </p>
                <button
                    type="button"
                    class="text-violet-700 hover:underline"
                    on:click=move |_| set_sent_to.set(None)
                >
                    "Use a different email"
                </button>
            </Show>
            <div class="mt-4 text-sm">
                <ANorm href="/auth">"Back to sign in"</ANorm>
            </div>
        </div>
    }
}
