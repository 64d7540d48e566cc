use crate::components::fields::{MembershipFields, RoleSelector, TextField};
use crate::components::session::{AuthEvent, Guard, replace, use_auth};
use crate::components::ui::*;
use crate::error::SubmitError;
use crate::gate::GatePolicy;
use crate::model::{Grade, Institution, Role};
use crate::validation::{Field, FieldErrors, FormKind, FormState, validate};

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::components::Redirect;

#[cfg(feature = "ssr")]
mod ssr {
    pub use crate::ssr::app_state::*;
    pub use crate::ssr::backend::*;
    pub use actix_web::HttpRequest;
    pub use leptos_actix::extract;
}

/// Save name and role details for the signed-in account and mark its profile completed.
#[server]
async fn update_profile(
    name: String,
    role: Role,
    grade: Option<String>,
    institution: Option<String>,
) -> Result<(), ServerFnError> {
    use self::ssr::*;

    let form = FormState {
        name,
        role,
        grade,
        institution,
        ..Default::default()
    };
    check_form(&form, FormKind::ProfileCompletion).map_err(BackendError::into_server_error)?;
    let details = form.profile_details().ok_or_else(|| {
        BackendError::Rejected("Please complete your profile".to_string()).into_server_error()
    })?;

    let request: HttpRequest = extract().await?;
    let app_state = use_app_state()?;
    let session = app_state
        .require_session(&request)
        .await
        .map_err(BackendError::into_server_error)?;
    app_state
        .update_profile(session.account_id, &details)
        .await
        .map_err(BackendError::into_server_error)?;
    Ok(())
}

#[component]
pub fn ProfileSetupPage() -> impl IntoView {
    view! {
        <Guard policy=GatePolicy::SIGNED_IN>
            <ProfileSetup />
        </Guard>
    }
}

#[component]
fn ProfileSetup() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let update_profile = ServerAction::<UpdateProfile>::new();
    let saved = RwSignal::new(false);

    let name = RwSignal::new(String::new());
    let role = RwSignal::new(Role::default());
    let grade = RwSignal::new(None::<String>);
    let institution = RwSignal::new(None::<String>);
    let errors = RwSignal::new(FieldErrors::default());

    // Start from whatever the profile already holds.
    if let Some(profile) = untrack(move || auth.profile()) {
        name.set(profile.name);
        role.set(profile.role);
        grade.set(profile.grade.map(|grade| Grade::code(grade).to_string()));
        institution.set(profile.institution.map(|i| Institution::name(i).to_string()));
    }

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if update_profile.pending().get_untracked() {
            return;
        }
        let form = FormState {
            name: name.get_untracked(),
            role: role.get_untracked(),
            grade: grade.get_untracked(),
            institution: institution.get_untracked(),
            ..Default::default()
        };
        let found = validate(&form, FormKind::ProfileCompletion);
        if !found.is_empty() {
            errors.set(found);
            return;
        }
        let (grade, institution) = match form.role {
            Role::Student => (form.grade, None),
            Role::Mentor => (None, form.institution),
        };
        update_profile.dispatch(UpdateProfile {
            name: form.name,
            role: form.role,
            grade,
            institution,
        });
    };

    Effect::new(move |_| match update_profile.value().get() {
        Some(Ok(())) => {
            toasts.success("Profile completed!", "Welcome to Math Mentor.");
            saved.set(true);
            auth.notify(AuthEvent::ProfileUpdated);
        }
        Some(Err(err)) => {
            let message = SubmitError::from(err).report("Profile update");
            toasts.error("Error", message);
        }
        None => {}
    });

    let completed = move || auth.profile().is_some_and(|profile| profile.profile_completed);

    view! {
        <Show when=move || saved.get() && completed()>
            <Redirect path="/" options=replace() />
        </Show>
        <div class="p-6 mx-auto mt-8 max-w-md bg-white rounded shadow">
            <h1 class="mb-1 text-2xl font-bold">"Complete your profile"</h1>
            <p class="mb-4 text-slate-600">"Tell us a little about yourself to get started."</p>
            <form class="flex flex-col gap-4" on:submit=on_submit novalidate>
                <TextField
                    field=Field::Name
                    label="Full name"
                    value=name
                    errors=errors
                    autocomplete="name"
                />
                <RoleSelector role=role errors=errors />
                <MembershipFields role=role grade=grade institution=institution errors=errors />
                <SubmitButton
                    pending=update_profile.pending()
                    label="Save profile"
                    busy_label="Saving..."
                />
            </form>
        </div>
    }
}
