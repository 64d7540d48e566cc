//! Screens behind the gate: the dashboard and the mentor's class list.
use crate::components::session::{AuthEvent, Guard, SignOut, use_auth};
use crate::components::ui::*;
use crate::error::SubmitError;
use crate::gate::GatePolicy;
use crate::model::{Grade, Membership, Profile, Role};

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <Guard policy=GatePolicy::PROTECTED>
            <Home />
        </Guard>
    }
}

#[component]
pub fn ClassesPage() -> impl IntoView {
    view! {
        <Guard policy=GatePolicy::with_role(Role::Mentor)>
            <Classes />
        </Guard>
    }
}

/// Header with the user's name and a sign out button.
#[component]
fn Header() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let sign_out = ServerAction::<SignOut>::new();

    Effect::new(move |_| match sign_out.value().get() {
        Some(Ok(())) => {
            toasts.success("Signed out", "See you next time!");
            auth.notify(AuthEvent::SignedOut);
        }
        Some(Err(err)) => {
            let message = SubmitError::from(err).report("Sign out");
            toasts.error("Error", message);
        }
        None => {}
    });

    view! {
        <header class="flex justify-between items-center py-3 px-4 mb-4 bg-white shadow">
            <ANorm href="/">
                <span class="text-xl font-bold">"Math Mentor"</span>
            </ANorm>
            <div class="flex gap-4 items-center">
                <span class="text-slate-600">
                    {move || auth.profile().map(|profile| profile.name).unwrap_or_default()}
                </span>
                <button
                    type="button"
                    class="flex gap-2 items-center py-1 px-3 rounded border border-slate-300 hover:bg-slate-100 disabled:opacity-50"
                    disabled=move || sign_out.pending().get()
                    on:click=move |_| {
                        if !sign_out.pending().get_untracked() {
                            sign_out.dispatch(SignOut {});
                        }
                    }
                >
                    <Show when=move || sign_out.pending().get()>
                        <Spinner />
                    </Show>
                    "Sign out"
                </button>
            </div>
        </header>
    }
}

/// Sidebar: grades for a student, class management for a mentor.
#[component]
fn GradeNavigation(membership: Membership) -> impl IntoView {
    match membership {
        Membership::Student { grade } => view! {
            <nav class="flex flex-col gap-1">
                <h2 class="mb-1 font-bold">"Grades"</h2>
                {Grade::ALL
                    .into_iter()
                    .map(|option| {
                        let class = if option == grade {
                            "py-1 px-2 rounded font-bold bg-violet-100 text-violet-800"
                        } else {
                            "py-1 px-2 rounded text-slate-600"
                        };
                        view! {
                            <span class=class aria-current=(option == grade).then_some("true")>
                                {option.label()}
                            </span>
                        }
                    })
                    .collect_view()}
            </nav>
        }
        .into_any(),
        Membership::Mentor { .. } => view! {
            <nav class="flex flex-col gap-1">
                <h2 class="mb-1 font-bold">"Mentor"</h2>
                <ANorm href="/classes">"Class management"</ANorm>
            </nav>
        }
        .into_any(),
    }
}

fn greeting(profile: &Profile) -> String {
    match profile.membership() {
        Some(Membership::Student { grade }) => {
            format!("You are learning with the {} class.", grade.label())
        }
        Some(Membership::Mentor { institution }) => {
            format!("You are mentoring at {}.", institution.name())
        }
        None => "Your profile is missing a few details.".to_string(),
    }
}

#[component]
fn Home() -> impl IntoView {
    let auth = use_auth();

    view! {
        <Header />
        {move || {
            auth.profile()
                .map(|profile| {
                    let greeting = greeting(&profile);
                    let incomplete = profile.membership().is_none();
                    view! {
                        <div class="flex gap-6 px-4">
                            <aside class="w-48">
                                {profile
                                    .membership()
                                    .map(|membership| {
                                        view! { <GradeNavigation membership=membership /> }
                                    })}
                            </aside>
                            <section>
                                <h1 class="mb-2 text-3xl font-bold">
                                    "Welcome, " {profile.name} "!"
                                </h1>
                                <p class="text-slate-600">{greeting}</p>
                                <Show when=move || incomplete>
                                    <ANorm href="/profile-setup">"Finish your profile"</ANorm>
                                </Show>
                            </section>
                        </div>
                    }
                })
        }}
    }
}

#[component]
fn Classes() -> impl IntoView {
    let auth = use_auth();
    let institution = move || {
        auth.profile()
            .and_then(|profile| profile.institution)
            .map(|institution| institution.name())
            .unwrap_or_default()
    };

    view! {
        <Header />
        <section class="px-4">
            <h1 class="mb-2 text-3xl font-bold">"Class management"</h1>
            <p class="text-slate-600">
                "Classes you mentor at " {institution} " will show up here."
            </p>
        </section>
    }
}
